use aseobi_core::config::{AppConfig, LoadOptions};
use aseobi_core::Catalog;
use aseobi_whatsapp::gateway::CloudApiGateway;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CATALOG_FAILURE, EXIT_CONFIG_FAILURE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn exit_code(&self) -> u8 {
        let failed = |name: &str| {
            self.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
        };

        if failed("config_validation") {
            EXIT_CONFIG_FAILURE
        } else if failed("catalog_load") {
            EXIT_CATALOG_FAILURE
        } else if self.overall_status == CheckStatus::Fail {
            1
        } else {
            0
        }
    }
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = report.exit_code();

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult::raw(exit_code, output);
    }

    CommandResult::raw(exit_code, render_human(&report))
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_gateway(&config));
            checks.push(check_payload_signatures(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog_load", "gateway_readiness", "payload_signatures"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    let source = config
        .catalog
        .path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());

    match Catalog::load(config.catalog.path.as_deref()) {
        Ok(catalog) => DoctorCheck {
            name: "catalog_load",
            status: CheckStatus::Pass,
            details: format!(
                "{} categories and {} products loaded from {source}",
                catalog.len(),
                catalog.product_count()
            ),
        },
        Err(error) => DoctorCheck {
            name: "catalog_load",
            status: CheckStatus::Fail,
            details: format!("{source}: {error}"),
        },
    }
}

fn check_gateway(config: &AppConfig) -> DoctorCheck {
    if config.whatsapp.dry_run {
        return DoctorCheck {
            name: "gateway_readiness",
            status: CheckStatus::Pass,
            details: "dry run enabled; outbound messages are logged, not delivered".to_string(),
        };
    }

    match CloudApiGateway::from_config(config) {
        Ok(gateway) => DoctorCheck {
            name: "gateway_readiness",
            status: CheckStatus::Pass,
            details: format!("posting to `{}`", gateway.messages_url()),
        },
        Err(error) => DoctorCheck {
            name: "gateway_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_payload_signatures(config: &AppConfig) -> DoctorCheck {
    let details = if config.whatsapp.app_secret.is_some() {
        "X-Hub-Signature-256 is required on webhook deliveries"
    } else {
        "no app secret configured; webhook deliveries are not signature-checked"
    };

    DoctorCheck {
        name: "payload_signatures",
        status: CheckStatus::Pass,
        details: details.to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
