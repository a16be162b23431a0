//! Image Narrator entrypoint: load the engines once, then run either a
//! one-shot analysis or the interactive narration session.

use std::io::{self, Write};

use anyhow::{bail, Result};

use image_narrator::caption::generate_alternatives;
use image_narrator::config::AppConfig;
use image_narrator::doctor::doctor_report;
use image_narrator::engines::Engines;
use image_narrator::image::ImageInput;
use image_narrator::session::Session;
use image_narrator::{init_logging, init_tracing};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);

    // Engines load once per process and are reused read-only afterwards.
    let engines = Engines::load(&config);

    if config.doctor {
        print!("{}", doctor_report(&config, &engines).render());
        return Ok(());
    }

    if config.once && config.image.is_none() {
        bail!("--once requires --image <PATH>");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = Session::new(&config, &engines);
    if let Some(path) = &config.image {
        let image = ImageInput::open(path)?;
        session.load_image(image, &mut out)?;

        if config.alternatives > 0 {
            print_alternatives(&config, &engines, path.as_path(), &mut out)?;
        }
        if config.once {
            return Ok(());
        }
    }

    write!(out, "narrator> ")?;
    out.flush()?;
    session.run(io::stdin().lock(), &mut out)
}

fn print_alternatives(
    config: &AppConfig,
    engines: &Engines,
    image: &std::path::Path,
    out: &mut impl Write,
) -> Result<()> {
    let Some(model) = &engines.caption else {
        writeln!(out, "Alternative captions unavailable: captioning is disabled.")?;
        return Ok(());
    };
    match generate_alternatives(model.as_ref(), image, config.alternatives) {
        Ok(captions) => {
            writeln!(out, "Alternative descriptions:")?;
            for (i, caption) in captions.iter().enumerate() {
                writeln!(out, "  {}. {caption}", i + 1)?;
            }
        }
        Err(err) => writeln!(out, "Alternative captions failed: {err}")?,
    }
    Ok(())
}
