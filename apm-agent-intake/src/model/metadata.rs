use apm_agent::Config;
use serde::Serialize;

/// Agent name reported in metadata.
pub(crate) const AGENT_NAME: &str = "apm-agent-rust";

/// The process/service record sent as the first line of every payload.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Metadata {
    service: Service,
    process: Process,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<System>,
}

#[derive(Clone, Debug, Serialize)]
struct Service {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<String>,
    agent: Agent,
    language: Language,
}

#[derive(Clone, Debug, Serialize)]
struct Agent {
    name: &'static str,
    version: &'static str,
}

#[derive(Clone, Debug, Serialize)]
struct Language {
    name: &'static str,
}

#[derive(Clone, Debug, Serialize)]
struct Process {
    pid: u32,
}

#[derive(Clone, Debug, Serialize)]
struct System {
    hostname: String,
}

impl Metadata {
    pub(crate) fn new(config: &Config) -> Self {
        Metadata {
            service: Service {
                name: config.service_name().to_string(),
                version: config.service_version().map(str::to_string),
                environment: config.environment().map(str::to_string),
                agent: Agent {
                    name: AGENT_NAME,
                    version: env!("CARGO_PKG_VERSION"),
                },
                language: Language { name: "rust" },
            },
            process: Process {
                pid: std::process::id(),
            },
            system: std::env::var("HOSTNAME")
                .ok()
                .filter(|hostname| !hostname.is_empty())
                .map(|hostname| System { hostname }),
        }
    }
}
