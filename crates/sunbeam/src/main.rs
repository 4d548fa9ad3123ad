use std::collections::BTreeMap;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use extension_client::{ClientConfig, Extension, ExtensionClient, Origin};
use sunbeam::cli::Cli;
use sunbeam::page::Page;
use sunbeam::root::{extension_items, root_items};
use sunbeam::{
    system, AppMessage, LauncherError, Paginator, PendingHandOff, Registry, RootPage, Runner,
    RuntimeHost, ROOT_TITLE,
};
use sunbeam_protocol::{ParamValue, SchemaValidator};
use sunbeam_store::{Config, History, PreferenceStore, StorePaths};
use sunbeam_tui::config::EnvConfig;
use sunbeam_tui::logging::init_tracing;
use sunbeam_tui::{
    default_keybindings_handle, parse_input_events, KeybindingsHandle, ProcessTerminal, Runtime,
    RuntimeEvent,
};

type LauncherRuntime = Runtime<ProcessTerminal, AppMessage>;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("sunbeam: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LauncherError> {
    let env = EnvConfig::from_env();
    env.apply();

    let mut paths = StorePaths::from_env()?;
    if let Some(config) = &cli.config {
        paths = paths.with_config(config);
    }
    let log_path = env.log_file.clone().unwrap_or_else(|| paths.log.clone());
    if let Err(error) = init_tracing(&log_path) {
        eprintln!("sunbeam: logging disabled: {error}");
    }

    let config = Config::load(&paths.config)?;
    let preferences = PreferenceStore::load(&paths.preferences)?;
    let history = History::load(&paths.history)?;

    let validator = Arc::new(SchemaValidator::new()?);
    let client = Arc::new(
        ExtensionClient::new(ClientConfig::new(), validator).map_err(LauncherError::Client)?,
    );
    let registry = load_extensions(
        &client,
        &config,
        &preferences,
        cli.extension.as_deref(),
    )?;

    let keybindings = default_keybindings_handle();
    let first = initial_page(&cli, &registry, &config, &history, keybindings.clone())?;
    let mut paginator = Paginator::new(registry, keybindings)
        .with_preferences(preferences)
        .with_history(history);

    let terminal = ProcessTerminal::new().with_write_log(env.tui_write_log.clone());
    let mut runtime: LauncherRuntime = Runtime::new(terminal);
    let mut host = RuntimeHost::new(runtime.handle());

    runtime.start()?;
    let (width, height) = runtime.size();
    paginator.set_size(width, height);
    paginator.push(first, &mut host);

    let result = event_loop(&mut runtime, &mut paginator, &mut host);
    runtime.stop()?;
    result.map_err(LauncherError::from)
}

/// Loads every configured extension, or only `requested` when set. Broken
/// extensions are skipped unless they were asked for by name.
fn load_extensions(
    client: &Arc<ExtensionClient>,
    config: &Config,
    preferences: &PreferenceStore,
    requested: Option<&str>,
) -> Result<Registry, LauncherError> {
    if let Some(alias) = requested {
        if !config.extensions.contains_key(alias) {
            return Err(LauncherError::UnknownExtension(alias.to_string()));
        }
    }

    let mut registry = Registry::new();
    for (alias, entry) in &config.extensions {
        if requested.is_some_and(|requested| requested != alias) {
            continue;
        }
        let loaded = Origin::parse(&entry.origin).and_then(|origin| {
            let mut values = entry.preferences.clone();
            if let Some(stored) = preferences.get(alias, &origin.to_string()) {
                values.extend(stored.clone());
            }
            Extension::load(Arc::clone(client), alias.clone(), origin, values)
        });
        match loaded {
            Ok(extension) => {
                tracing::debug!(alias = %alias, "extension loaded");
                registry.insert(extension);
            }
            Err(source) if requested.is_some() => {
                return Err(LauncherError::Extension {
                    alias: alias.clone(),
                    source,
                });
            }
            Err(error) => tracing::warn!(alias = %alias, %error, "skipping extension"),
        }
    }
    Ok(registry)
}

fn initial_page(
    cli: &Cli,
    registry: &Registry,
    config: &Config,
    history: &History,
    keybindings: KeybindingsHandle,
) -> Result<Box<dyn Page>, LauncherError> {
    let Some(alias) = cli.extension.as_deref() else {
        let items = root_items(registry.extensions(), config);
        return Ok(Box::new(RootPage::new(
            ROOT_TITLE,
            items,
            registry.extensions().clone(),
            Some(history.clone()),
            keybindings,
        )));
    };
    let extension = registry
        .get(alias)
        .cloned()
        .ok_or_else(|| LauncherError::UnknownExtension(alias.to_string()))?;

    match cli.command.as_deref() {
        Some(command) => {
            let params = parse_params(&cli.params)?;
            let runner = Runner::new(Arc::clone(&extension), command, params, keybindings)
                .map_err(|source| LauncherError::Extension {
                    alias: alias.to_string(),
                    source,
                })?;
            Ok(Box::new(runner))
        }
        None => {
            let extra = config
                .extensions
                .get(alias)
                .map(|entry| entry.root.as_slice())
                .unwrap_or_default();
            let items = extension_items(&extension, extra);
            let title = extension.manifest.title.clone();
            let mut extensions = BTreeMap::new();
            extensions.insert(alias.to_string(), extension);
            Ok(Box::new(RootPage::new(
                title,
                items,
                extensions,
                Some(history.clone()),
                keybindings,
            )))
        }
    }
}

/// `KEY=VALUE` pairs from `-p`, as string params.
fn parse_params(raw: &[String]) -> Result<BTreeMap<String, ParamValue>, LauncherError> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                Ok((key.to_string(), ParamValue::from(value)))
            }
            _ => Err(LauncherError::InvalidParam(pair.clone())),
        })
        .collect()
}

fn event_loop(
    runtime: &mut LauncherRuntime,
    paginator: &mut Paginator,
    host: &mut RuntimeHost,
) -> io::Result<()> {
    loop {
        run_hand_offs(runtime, paginator, host)?;
        if paginator.should_exit() {
            return Ok(());
        }
        runtime.render(&paginator.render());

        let Some(event) = runtime.next_event() else {
            return Ok(());
        };
        match event {
            RuntimeEvent::Input(data) => {
                for event in parse_input_events(&data) {
                    paginator.handle_input(&event, host);
                    if paginator.should_exit() || host.has_hand_offs() {
                        break;
                    }
                }
            }
            RuntimeEvent::Resize => {
                let (width, height) = runtime.size();
                paginator.set_size(width, height);
            }
            RuntimeEvent::Message(message) => paginator.handle_message(message, host),
        }
    }
}

/// Gives the terminal to each queued child process in turn.
fn run_hand_offs(
    runtime: &mut LauncherRuntime,
    paginator: &mut Paginator,
    host: &mut RuntimeHost,
) -> io::Result<()> {
    while let Some(PendingHandOff {
        target,
        request,
        followup,
    }) = host.take_hand_off()
    {
        tracing::info!(target, "handing the terminal to a child process");
        let result = runtime.suspend(|| system::run_hand_off(&request))?;
        let (width, height) = runtime.size();
        paginator.set_size(width, height);
        paginator.hand_off_finished(target, result, followup, host);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_params;
    use sunbeam_protocol::ParamValue;

    #[test]
    fn params_split_on_the_first_equals_sign() {
        let params = parse_params(&["query=a=b".to_string()]).expect("valid params");
        assert_eq!(params.get("query"), Some(&ParamValue::from("a=b")));
    }

    #[test]
    fn params_without_a_key_are_rejected() {
        assert!(parse_params(&["=value".to_string()]).is_err());
        assert!(parse_params(&["novalue".to_string()]).is_err());
    }
}
