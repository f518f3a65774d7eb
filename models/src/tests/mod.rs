mod route_builder;
mod user;
