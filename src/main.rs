//! Demo binary: click anywhere to blast confetti at the cursor.
//!
//! Run with: `cargo run -- [path/to/confetti.ron]`
//!
//! Without an argument the default burst is used. `config/confetti.ron` is a
//! starting point for custom palettes and sizes.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_confetti::{BlastConfetti, ConfettiConfig, ConfettiFinished, ConfettiPlugin};

/// Config applied to every burst.
#[derive(Resource)]
struct DemoConfig(ConfettiConfig);

/// Entity all bursts attach to.
#[derive(Resource)]
struct Surface(Entity);

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Confetti".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(ConfettiPlugin)
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.12)))
        .add_systems(Startup, (load_config, setup))
        .add_systems(Update, (blast_on_click, despawn_finished))
        .run();
}

/// Read the optional RON path from the command line once logging is up.
fn load_config(mut commands: Commands) {
    let config = config_from_arg(std::env::args().nth(1));
    commands.insert_resource(DemoConfig(config));
}

/// Load `path` if given, falling back to the defaults with a warning.
fn config_from_arg(path: Option<String>) -> ConfettiConfig {
    match path {
        Some(path) => match ConfettiConfig::load(&path) {
            Ok(config) => {
                info!("Loaded confetti config from {}", path);
                config
            }
            Err(err) => {
                warn!("Failed to load {}: {}; using defaults", path, err);
                ConfettiConfig::default()
            }
        },
        None => ConfettiConfig::default(),
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
    let surface = commands
        .spawn((Name::new("Confetti Surface"), Transform::default(), Visibility::default()))
        .id();
    commands.insert_resource(Surface(surface));
}

fn blast_on_click(
    buttons: Res<ButtonInput<MouseButton>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
    surface: Res<Surface>,
    demo: Res<DemoConfig>,
    mut blasts: MessageWriter<BlastConfetti>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let (camera, camera_transform) = *camera;
    let Ok(origin) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    let mut config = demo.0.clone();
    config.emitter_position = origin;
    blasts.write(BlastConfetti {
        target: surface.0,
        config,
    });
}

/// The plugin never removes bursts on its own; the demo cleans up here.
fn despawn_finished(mut commands: Commands, finished: Query<Entity, Added<ConfettiFinished>>) {
    for entity in &finished {
        commands.entity(entity).despawn();
    }
}
