use std::{fs, time::Instant};

use anyhow::Context;
use futures::future::join_all;
use glyph_model::params::checkpoint;
use log::{info, warn};

use font_explorer::{FontConfig, FontModel, InferenceRequest, RgbaImage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = FontConfig::from_env()?;
    let store = checkpoint::load(&config.checkpoint)
        .with_context(|| format!("loading {}", config.checkpoint.display()))?;

    let model = FontModel::new(&config);
    model.load(store)?;

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating {}", config.out_dir.display()))?;

    let embedding = config.embedding();
    let start = Instant::now();

    // Earlier characters go first, repeated ones share a single computation.
    let renders = config.characters.chars().enumerate().map(|(i, c)| {
        let request = InferenceRequest::new(0, embedding.to_vec(), c, RgbaImage::new())
            .with_priority(-(i as i32));
        let model = &model;
        async move { (c, model.render(request).await) }
    });

    let mut rendered = 0;
    let results = join_all(renders).await;
    let total = results.len();

    for (c, result) in results {
        let image = match result {
            Ok(image) => image,
            Err(e) => {
                warn!("couldn't render {c:?}: {e}");
                continue;
            }
        };

        // Code points keep 'A' and 'a' apart on case-insensitive file systems.
        let path = config.out_dir.join(format!("glyph_{:04x}.pam", c as u32));
        image
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        rendered += 1;
    }

    info!(
        "rendered {rendered}/{total} glyphs into {} in {:?}",
        config.out_dir.display(),
        start.elapsed()
    );

    Ok(())
}
