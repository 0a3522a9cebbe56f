use std::path::PathBuf;

use scene_editor_lib::command::execute_json_batch;
use scene_editor_lib::harness::TestHarness;
use scene_editor_lib::registry::TypeRegistry;
use scene_editor_lib::state::EditorSettings;

#[derive(Debug, Default)]
struct Args {
    project: Option<PathBuf>,
    commands: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_editor=info,scene_editor_lib=info".into()),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: scene-editor [--project <file>] [--commands <file>] [--out <file>]");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let settings = EditorSettings::load();
    let mut harness = TestHarness::with_settings(TypeRegistry::with_builtin_types(), settings);

    if let Some(path) = &args.project {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read project file {}: {e}", path.display()))?;
        let report = harness
            .load_project_json(&json)
            .map_err(|e| format!("Failed to load project {}: {e}", path.display()))?;
        tracing::info!(
            "Loaded project from {} ({} entities, {} skipped)",
            path.display(),
            report.loaded,
            report.skipped.len()
        );
    }

    if let Some(path) = &args.commands {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read command file {}: {e}", path.display()))?;
        let responses = execute_json_batch(&mut harness, &json)?;
        let failed = responses.iter().filter(|r| !r.success).count();
        if failed > 0 {
            tracing::warn!("{failed} of {} commands failed", responses.len());
        }
        let out = serde_json::to_string_pretty(&responses).map_err(|e| e.to_string())?;
        println!("{out}");
    }
    harness.settle();

    match &args.out {
        Some(path) => {
            harness
                .state
                .store
                .save_to_path(path)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            tracing::info!("Saved project to {}", path.display());
        }
        None if args.commands.is_none() => {
            let json = harness.export_project_json().map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        None => {}
    }
    Ok(())
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let slot = match flag.as_str() {
            "--project" => &mut args.project,
            "--commands" => &mut args.commands,
            "--out" => &mut args.out,
            other => return Err(format!("unknown argument '{other}'")),
        };
        let value = it
            .next()
            .ok_or_else(|| format!("{flag} expects a path"))?;
        *slot = Some(PathBuf::from(value));
    }
    Ok(args)
}
