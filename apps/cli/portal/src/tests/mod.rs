mod commands;
mod logger;
mod routes;
