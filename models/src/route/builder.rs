use crate::error::model_error::ModelError;
use crate::route::{RouteDescriptor, RouteMeta, is_catch_all_segment};

use common::ErrorLocation;

use std::panic::Location;

/// Builder for creating validated RouteDescriptor instances.
#[derive(Debug, Default)]
pub struct RouteDescriptorBuilder {
    path: Option<String>,
    name: Option<String>,
    component: Option<String>,
    meta: RouteMeta,
}

impl RouteDescriptorBuilder {
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn guest(mut self) -> Self {
        self.meta.guest = true;
        self
    }

    /// Build the RouteDescriptor with validation.
    ///
    /// `component` defaults to the route name when not given.
    #[track_caller]
    pub fn build(self) -> Result<RouteDescriptor, ModelError> {
        let path = self.path.ok_or_else(|| ModelError::Validation {
            message: String::from("Path is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !path.starts_with('/') {
            return Err(ModelError::Validation {
                message: format!("Path must start with '/': {path}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if let Some(position) = segments.iter().position(|s| is_catch_all_segment(s)) {
            if position != segments.len() - 1 {
                return Err(ModelError::Validation {
                    message: format!("Catch-all segment must be last: {path}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        if segments.iter().any(|s| *s == ":") {
            return Err(ModelError::Validation {
                message: format!("Parameter segment needs a name: {path}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let name = self.name.ok_or_else(|| ModelError::Validation {
            message: String::from("Route name is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if name.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Route name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.meta.requires_auth && self.meta.guest {
            return Err(ModelError::Validation {
                message: format!("Route '{name}' cannot be both protected and guest-only"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let component = self.component.unwrap_or_else(|| name.clone());

        Ok(RouteDescriptor {
            path,
            name,
            component,
            meta: self.meta,
        })
    }
}
