use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::models::{ContainerCreateBody, HostConfig, Mount, MountTypeEnum};
use bollard::query_parameters::{
    CreateContainerOptions, LogsOptions, StartContainerOptions, StopContainerOptions,
    WaitContainerOptions,
};
use futures_util::stream::StreamExt;

use super::{SUBMISSION_FILES_DIR, SandboxBackend, SandboxError, SandboxHandle, SandboxSpec};

/// Numeric user the submission runs as inside the container; grading images
/// are built with this UID owning nothing of value.
const SANDBOX_USER: &str = "1000";

/// Sandbox backend over the Docker Engine API.
///
/// The underlying client is cheap to clone and safe to share across
/// concurrent runs.
pub struct DockerBackend {
    docker: Docker,
}

impl DockerBackend {
    pub fn connect() -> Result<Self, SandboxError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| SandboxError::Backend(e.to_string()))?;
        Ok(Self { docker })
    }
}

impl From<bollard::errors::Error> for SandboxError {
    fn from(err: bollard::errors::Error) -> Self {
        SandboxError::Backend(err.to_string())
    }
}

#[async_trait]
impl SandboxBackend for DockerBackend {
    async fn create(&self, spec: &SandboxSpec) -> Result<SandboxHandle, SandboxError> {
        let options = CreateContainerOptions {
            name: Some(spec.name.clone()),
            ..Default::default()
        };

        let config = ContainerCreateBody {
            image: Some(spec.image.clone()),
            cmd: Some(vec!["sh".to_string(), format!("{}.sh", spec.part_id)]),
            user: Some(SANDBOX_USER.to_string()),
            network_disabled: Some(true),
            host_config: Some(HostConfig {
                mounts: Some(vec![Mount {
                    typ: Some(MountTypeEnum::BIND),
                    source: Some(spec.mount_dir.to_string_lossy().into_owned()),
                    target: Some(SUBMISSION_FILES_DIR.to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self.docker.create_container(Some(options), config).await?;
        log::debug!("Created sandbox {} ({})", spec.name, created.id);

        Ok(SandboxHandle { id: created.id })
    }

    async fn start(&self, sandbox: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker
            .start_container(&sandbox.id, None::<StartContainerOptions>)
            .await?;
        Ok(())
    }

    async fn wait_not_running(&self, sandbox: &SandboxHandle) -> Result<i64, SandboxError> {
        let mut wait_stream = self
            .docker
            .wait_container(&sandbox.id, None::<WaitContainerOptions>);

        match wait_stream.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // bollard surfaces a nonzero exit status as an error variant
            // carrying the code; for us that is a normal outcome.
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(e)) => Err(e.into()),
            None => Err(SandboxError::WaitEnded),
        }
    }

    async fn stdout_logs(&self, sandbox: &SandboxHandle) -> Result<String, SandboxError> {
        let mut log_stream = self.docker.logs(
            &sandbox.id,
            Some(LogsOptions {
                stdout: true,
                ..Default::default()
            }),
        );

        let mut output = String::new();
        while let Some(entry) = log_stream.next().await {
            if let LogOutput::StdOut { message } = entry? {
                output.push_str(&String::from_utf8_lossy(&message));
            }
        }

        Ok(output)
    }

    async fn stop(&self, sandbox: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker
            .stop_container(
                &sandbox.id,
                Some(StopContainerOptions {
                    t: Some(0),
                    ..Default::default()
                }),
            )
            .await?;
        Ok(())
    }
}
