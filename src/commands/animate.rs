//! Animations of captured images.
//!
//! One animation per `{location}/{object}/{camera}` directory, written as
//! `{output}/{location}-{object}-{camera}.{gif|mp4}`.

use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use analemma::animation::{AnimationFormat, Encoder};
use analemma::capture::CaptureStore;
use analemma::registry::{CameraDirection, CelestialObject};

use super::App;

/// Which capture directories to animate; `None` means all.
pub struct Filter {
    pub location: Option<String>,
    pub object: Option<CelestialObject>,
    pub camera: Option<CameraDirection>,
}

/// Encode every matching capture directory.
pub async fn execute(
    app: &App,
    filter: &Filter,
    format: AnimationFormat,
    fps: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| app.settings.animations_dir.clone());
    let store = CaptureStore::new(&app.settings.captures_dir);
    let encoder = Encoder::new(fps);

    let mut generated = 0usize;
    for location in app.registry.select(filter.location.as_deref())? {
        for object in CelestialObject::ALL {
            if filter.object.is_some_and(|o| o != object) {
                continue;
            }
            for camera in &location.cameras {
                if filter.camera.is_some_and(|c| c != camera.direction) {
                    continue;
                }

                let dir = store.directory(&location.id, object, camera.direction);
                let images = CaptureStore::list_images(&dir).await?;
                let target = output.join(format!(
                    "{}-{object}-{}.{}",
                    location.id,
                    camera.direction,
                    format.extension()
                ));

                match encoder.encode(&images, &target, format).await {
                    Ok(true) => {
                        generated += 1;
                        println!("Created {}", target.display());
                    },
                    Ok(false) => {},
                    Err(err) => warn!(dir = %dir.display(), error = %err, "Animation failed"),
                }
            }
        }
    }

    println!("Generated {generated} animation(s)");
    Ok(())
}
