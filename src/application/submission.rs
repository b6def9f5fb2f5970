//! Shared preparation for validation and deployment
//!
//! Both use cases read the template, inject parameter defaults the same
//! way and hand the provider an identical submission.

use std::path::Path;

use crate::domain::entities::{DeploymentRequest, ParameterOverrides, TemplateInfo};
use crate::domain::ports::DeploymentSubmission;
use crate::domain::services::{effective_parameters, EffectiveParameters};
use crate::domain::value_objects::deployment_name;
use crate::error::{DeployError, DeployResult};

/// A request with its template read and parameters settled
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDeployment {
    pub template: TemplateInfo,
    pub parameters: EffectiveParameters,
}

impl PreparedDeployment {
    pub fn prepare(
        request: &DeploymentRequest,
        defaults: &ParameterOverrides,
    ) -> DeployResult<Self> {
        if let Some(name) = request.deployment_name.as_deref().filter(|n| !n.is_empty()) {
            deployment_name::check(name)?;
        }
        let content = read_existing(&request.template_file)?;
        if let Some(parameter_file) = &request.parameter_file {
            if !parameter_file.is_file() {
                return Err(DeployError::MissingTemplateFile {
                    path: parameter_file.clone(),
                });
            }
        }

        let template = TemplateInfo::parse(&request.template_file, &content)?;
        let parameters = effective_parameters(&template, &request.overrides, defaults);
        Ok(Self {
            template,
            parameters,
        })
    }

    pub fn submission(&self, request: &DeploymentRequest, name: &str) -> DeploymentSubmission {
        DeploymentSubmission {
            name: name.to_string(),
            template_file: request.template_file.clone(),
            parameter_file: request.parameter_file.clone(),
            parameters: self.parameters.parameters.clone(),
            location: request.location.clone(),
        }
    }
}

fn read_existing(path: &Path) -> DeployResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DeployError::MissingTemplateFile {
            path: path.to_path_buf(),
        },
        _ => DeployError::Io(e),
    })
}
