//! spaceswitch CLI - drive rig space switching on a JSON scene
//!
//! Loads a scene description, runs one operation on the selected controls
//! and optionally writes the modified scene back out.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use spaceswitch::{
    autogen, read_config, validate, write_config, GroupKind, Intersection, IntersectionEntry,
    KeyOptions,
};
use spaceswitch_scene::{short_name, MemoryScene, SceneDocument, SceneGraph};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spaceswitch")]
#[command(about = "Switch and match parent spaces on rig controls", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Group {
    /// Position spaces
    Spaces,
    /// Rotation spaces
    Rotation,
}

impl From<Group> for GroupKind {
    fn from(group: Group) -> Self {
        match group {
            Group::Spaces => GroupKind::Spaces,
            Group::Rotation => GroupKind::RotationSpaces,
        }
    }
}

#[derive(Args)]
struct SceneArgs {
    /// Scene description (.json)
    #[arg(short, long)]
    scene: PathBuf,
}

#[derive(Args)]
struct KeyArgs {
    /// Set keyframes on the attributes written
    #[arg(long)]
    key: bool,
    /// Write and key even when an attribute already holds the value
    #[arg(long)]
    force_key: bool,
    /// Use stepped tangents on keys
    #[arg(long)]
    step_tangents: bool,
}

impl From<&KeyArgs> for KeyOptions {
    fn from(args: &KeyArgs) -> Self {
        KeyOptions {
            key_enabled: args.key,
            force_key_if_already_at_value: args.force_key,
            step_tangent_keys: args.step_tangents,
        }
    }
}

#[derive(Args)]
struct EntryArgs {
    #[command(flatten)]
    scene: SceneArgs,
    /// Space group to operate on
    #[arg(short, long, value_enum, default_value = "spaces")]
    group: Group,
    /// Name of the aligned space
    #[arg(long)]
    space: String,
    /// Write the modified scene here
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Controls, in selection order
    #[arg(required = true)]
    controls: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration template
    Template,
    /// Check a configuration against a control
    Validate {
        #[command(flatten)]
        scene: SceneArgs,
        /// Control path
        control: String,
        /// Configuration file (default: the configuration stored on the control)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration and store it on a control
    SetConfig {
        #[command(flatten)]
        scene: SceneArgs,
        /// Control path
        control: String,
        /// Configuration file
        config: PathBuf,
        /// Write the modified scene here (default: overwrite the input)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print a configuration generated from a control's attributes
    Generate {
        #[command(flatten)]
        scene: SceneArgs,
        /// Control path
        control: String,
    },
    /// List the spaces shared by the given controls
    List {
        #[command(flatten)]
        scene: SceneArgs,
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Controls, in selection order
        #[arg(required = true)]
        controls: Vec<String>,
    },
    /// Switch the controls to a space
    Switch {
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Set the enable attribute of a space
    SetAttr {
        #[command(flatten)]
        entry: EntryArgs,
        /// Attribute value
        #[arg(long)]
        value: f64,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Move each space locator onto its control
    MatchToControl {
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Move each space locator onto the locator of another space
    MatchToSpace {
        #[command(flatten)]
        entry: EntryArgs,
        /// Space whose locators to match
        #[arg(long)]
        target: String,
        /// Group of the target space (default: same as --group)
        #[arg(long, value_enum)]
        target_group: Option<Group>,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Move each control to where the space would put it
    MatchControlToSpace {
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        keys: KeyArgs,
    },
    /// Select the space locators
    Select {
        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Reset the space locators to identity
    Zero {
        #[command(flatten)]
        entry: EntryArgs,
        #[command(flatten)]
        keys: KeyArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Template => {
            println!("{}", spaceswitch::default_template().to_json()?);
        }
        Commands::Validate {
            scene,
            control,
            config,
        } => {
            let scene = load_scene(&scene.scene)?;
            let json = match config {
                Some(path) => read_file(&path)?,
                None => read_config(&scene, &control)
                    .with_context(|| format!("{control} has no stored configuration"))?,
            };
            validate(&scene, &control, &json)?;
            println!("{control}: configuration is valid");
        }
        Commands::SetConfig {
            scene: scene_args,
            control,
            config,
            out,
        } => {
            let mut scene = load_scene(&scene_args.scene)?;
            let json = read_file(&config)?;
            let spaces = write_config(&mut scene, &control, &json)?;
            info!(
                control = %control,
                spaces = spaces.spaces().map_or(0, |g| g.len()),
                rotation_spaces = spaces.rotation_spaces().map_or(0, |g| g.len()),
                "configuration stored"
            );
            save_scene(&scene, out.as_deref().unwrap_or(&scene_args.scene))?;
        }
        Commands::Generate { scene, control } => {
            let scene = load_scene(&scene.scene)?;
            println!("{}", autogen::generate(&scene, &control)?.to_json()?);
        }
        Commands::List {
            scene,
            json,
            controls,
        } => {
            let scene = load_scene(&scene.scene)?;
            let intersection = Intersection::from_controls(&scene, &controls)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing_json(&intersection))?);
            } else {
                print_listing(&scene, &intersection)?;
            }
        }
        Commands::Switch { entry, keys } => {
            run_entry(&entry, |scene, e| e.switch_to_space(scene, &(&keys).into()))?;
        }
        Commands::SetAttr { entry, value, keys } => {
            run_entry(&entry, |scene, e| e.set_attribute(scene, value, &(&keys).into()))?;
        }
        Commands::MatchToControl { entry, keys } => {
            run_entry(&entry, |scene, e| e.match_to_control(scene, &(&keys).into()))?;
        }
        Commands::MatchToSpace {
            entry,
            target,
            target_group,
            keys,
        } => {
            let target_kind: GroupKind = target_group.unwrap_or(entry.group).into();
            run_entry_with(&entry, |scene, intersection, e| {
                let target = intersection
                    .entry(target_kind, &target)
                    .with_context(|| format!("no shared space named \"{target}\""))?;
                Ok(e.match_to_space(scene, &target, &(&keys).into())?)
            })?;
        }
        Commands::MatchControlToSpace { entry, keys } => {
            run_entry(&entry, |scene, e| e.match_control_to_space(scene, &(&keys).into()))?;
        }
        Commands::Select { entry } => {
            let scene = run_entry(&entry, |scene, e| e.select_transform(scene))?;
            for node in scene.selection() {
                println!("{node}");
            }
        }
        Commands::Zero { entry, keys } => {
            run_entry(&entry, |scene, e| e.zero_transform(scene, &(&keys).into()))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_scene(path: &Path) -> Result<MemoryScene> {
    let doc = SceneDocument::from_json(&read_file(path)?)
        .with_context(|| format!("failed to parse scene {}", path.display()))?;
    let scene = MemoryScene::from_document(&doc)?;
    debug!(path = %path.display(), nodes = doc.nodes.len(), "loaded scene");
    Ok(scene)
}

fn save_scene(scene: &MemoryScene, path: &Path) -> Result<()> {
    fs::write(path, scene.to_document().to_json()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote scene");
    Ok(())
}

/// Load the scene, resolve the aligned entry and run `op` on it.
fn run_entry_with<F>(args: &EntryArgs, op: F) -> Result<MemoryScene>
where
    F: FnOnce(&mut MemoryScene, &Intersection, IntersectionEntry<'_>) -> Result<()>,
{
    let mut scene = load_scene(&args.scene.scene)?;
    let intersection = Intersection::from_controls(&scene, &args.controls)?;
    let kind: GroupKind = args.group.into();
    if intersection.group(kind).is_none() {
        bail!("the selected controls share no \"{}\" group", kind.name());
    }
    let entry = intersection
        .entry(kind, &args.space)
        .with_context(|| format!("no shared space named \"{}\"", args.space))?;

    op(&mut scene, &intersection, entry)?;

    for write in scene.attribute_writes() {
        println!("{}.{} = {}", write.node, write.attribute, write.value);
    }
    for key in scene.keyframes() {
        println!("key {}.{} @ {}", key.node, key.attribute, key.value);
    }
    if let Some(out) = &args.out {
        save_scene(&scene, out)?;
    }
    Ok(scene)
}

fn run_entry<F>(args: &EntryArgs, op: F) -> Result<MemoryScene>
where
    F: FnOnce(&mut MemoryScene, IntersectionEntry<'_>) -> spaceswitch::Result<()>,
{
    run_entry_with(args, |scene, _, entry| Ok(op(scene, entry)?))
}

fn print_listing(scene: &MemoryScene, intersection: &Intersection) -> Result<()> {
    let names: Vec<&str> = intersection.control_names().map(short_name).collect();
    println!("Controls: {}", names.join(", "));

    for kind in GroupKind::ALL {
        let Some(group) = intersection.group(kind) else {
            println!("{}: (none)", kind.name());
            continue;
        };
        println!("{}:", kind.name());
        for entry in intersection.entries(kind) {
            let mut active = 0;
            for view in entry.views()? {
                if view.owner().active_index(scene, kind)? == Some(view.index()) {
                    active += 1;
                }
            }
            let marker = if active == entry.views()?.len() { "*" } else { " " };
            println!(" {marker} {}", entry.name());
        }
        if group.is_empty() {
            println!("   (no shared spaces)");
        }
    }
    Ok(())
}

fn listing_json(intersection: &Intersection) -> serde_json::Value {
    let group = |kind: GroupKind| {
        intersection
            .group(kind)
            .map(|g| serde_json::json!(g.names()))
            .unwrap_or(serde_json::Value::Null)
    };
    serde_json::json!({
        "controls": intersection.control_names().collect::<Vec<_>>(),
        "Spaces": group(GroupKind::Spaces),
        "Rotation Spaces": group(GroupKind::RotationSpaces),
    })
}
