use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use apiscribe_engine::{
    DiscoveryConfig, DiscoveryOptions, DiscoveryService, DocumentationIndex, default_config_path, load_config_from_path,
    load_manifest_from_path,
};
use apiscribe_mcp::{McpHttpServer, resolve_bind_address};
use apiscribe_util::resolve_relative_to;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("generate", sub)) => run_generate(sub),
        Some(("serve", sub)) => run_serve(sub).await,
        _ => anyhow::bail!("expected a subcommand"),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    let manifest = Arg::new("manifest")
        .long("manifest")
        .short('m')
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to the API manifest (JSON or YAML)");
    let config = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(clap::value_parser!(PathBuf))
        .help("Path to the discovery config (defaults to APISCRIBE_CONFIG_PATH or the user config dir)");

    Command::new("apiscribe")
        .about("Generates MCP tool discovery documents from API endpoint metadata")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Print the discovery document")
                .arg(manifest.clone())
                .arg(config.clone())
                .arg(
                    Arg::new("tools-only")
                        .long("tools-only")
                        .action(ArgAction::SetTrue)
                        .help("Print only the {\"tools\": [...]} listing"),
                )
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .action(ArgAction::SetTrue)
                        .help("Print single-line JSON"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the discovery document over HTTP until interrupted")
                .arg(manifest)
                .arg(config)
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .short('b')
                        .action(ArgAction::Set)
                        .help("Bind address, overriding httpServer.bindAddress"),
                ),
        )
}

fn run_generate(matches: &ArgMatches) -> Result<()> {
    let (service, _) = build_service(matches)?;
    let value = if matches.get_flag("tools-only") {
        service.tools_listing()?
    } else {
        serde_json::to_value(&*service.generate_document()?)?
    };

    let rendered = if matches.get_flag("compact") {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{rendered}");
    Ok(())
}

async fn run_serve(matches: &ArgMatches) -> Result<()> {
    let (service, config) = build_service(matches)?;
    let bind = matches.get_one::<String>("bind").map(String::as_str);
    let bind_address = resolve_bind_address(bind, &config.http_server.bind_address)?;

    let running = McpHttpServer::new(bind_address, Arc::new(service)).start().await?;
    info!(address = %running.bound_address(), "serving discovery document at /mcp");

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    running.stop().await
}

/// Loads config, manifest and documentation and wires the discovery service.
fn build_service(matches: &ArgMatches) -> Result<(DiscoveryService, DiscoveryConfig)> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(default_config_path);
    let config = load_config_from_path(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let manifest_path = matches.get_one::<PathBuf>("manifest").context("--manifest is required")?;
    let manifest = load_manifest_from_path(manifest_path)
        .with_context(|| format!("failed to load manifest from {}", manifest_path.display()))?;

    let mut service = DiscoveryService::from_manifest(manifest, DiscoveryOptions::from(&config));
    if let Some(documentation) = load_documentation(&config_path, &config)? {
        service = service.with_documentation(Arc::new(documentation));
    }
    Ok((service, config))
}

fn load_documentation(config_path: &Path, config: &DiscoveryConfig) -> Result<Option<DocumentationIndex>> {
    let Some(documentation_path) = config.documentation_path.as_deref() else {
        return Ok(None);
    };
    let path = resolve_relative_to(config_path, documentation_path);
    let index = DocumentationIndex::load(&path)
        .with_context(|| format!("failed to load documentation from {}", path.display()))?;
    Ok(Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"{
        "endpoints": [
            {
                "controller": "Orders",
                "action": "Get",
                "declaringType": "Shop.OrdersController",
                "attributes": [{ "kind": "httpMethod", "verb": "GET", "template": "api/orders/{id}" }],
                "parameters": [{ "name": "id", "type": "int" }],
                "returnType": "string"
            }
        ]
    }"#;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn generate_requires_a_manifest() {
        let result = build_cli().try_get_matches_from(["apiscribe", "generate"]);
        assert!(result.is_err());
    }

    #[test]
    fn generate_flags_parse() {
        let matches = build_cli()
            .try_get_matches_from(["apiscribe", "generate", "--manifest", "api.json", "--tools-only", "--compact"])
            .expect("parse arguments");
        let (name, sub) = matches.subcommand().expect("subcommand");

        assert_eq!(name, "generate");
        assert!(sub.get_flag("tools-only"));
        assert!(sub.get_flag("compact"));
        assert_eq!(sub.get_one::<PathBuf>("manifest"), Some(&PathBuf::from("api.json")));
    }

    #[test]
    fn documentation_path_resolves_next_to_config() {
        let dir = tempdir().expect("temp dir");
        let manifest_path = dir.path().join("api.json");
        let config_path = dir.path().join("discovery.yaml");
        fs::write(&manifest_path, MANIFEST).expect("write manifest");
        fs::write(&config_path, "documentationPath: docs.json\ntoolNameCasing: snake\n").expect("write config");
        fs::write(
            dir.path().join("docs.json"),
            r#"{ "members": { "M:Shop.OrdersController.Get": "Fetches one order." } }"#,
        )
        .expect("write docs");

        let matches = build_cli()
            .try_get_matches_from([
                "apiscribe",
                "generate",
                "--manifest",
                manifest_path.to_str().expect("utf-8 path"),
                "--config",
                config_path.to_str().expect("utf-8 path"),
            ])
            .expect("parse arguments");
        let (_, sub) = matches.subcommand().expect("subcommand");
        let (service, _) = build_service(sub).expect("build service");
        let document = service.generate_document().expect("generate document");

        assert_eq!(document.tools[0].name, "orders_get");
        assert_eq!(document.tools[0].description, "Fetches one order.");
    }

    #[test]
    fn missing_documentation_file_is_reported() {
        let dir = tempdir().expect("temp dir");
        let config_path = dir.path().join("discovery.json");
        fs::write(&config_path, r#"{ "documentationPath": "missing.json" }"#).expect("write config");
        let config = load_config_from_path(&config_path).expect("load config");

        let error = load_documentation(&config_path, &config).expect_err("missing docs");

        assert!(format!("{error:#}").contains("missing.json"));
    }
}
