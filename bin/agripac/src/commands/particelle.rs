//! Particelle commands.
//!
//! `add --geometria` accepts a GeoJSON polygon (inline or `@file`); the
//! sketch validates it and derives the computed surface and centroid that
//! travel with the payload.

use std::path::Path;

use anyhow::Result;

use agripac_client::types::{Particella, ParticellaCreate};
use agripac_client::Capability;
use agripac_geo::ParcelSketch;

use crate::render;

pub fn list(fascicolo_id: i64, json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require_any(&config, &[Capability::FascicoloOwn, Capability::FascicoloAll])?;

    let particelle = super::api(&config)?.get_particelle(fascicolo_id)?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&particelle)?);
        return Ok(());
    }
    if particelle.is_empty() {
        println!("Nessuna particella nel fascicolo {}.", fascicolo_id);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = particelle.iter().map(row).collect();
    print!(
        "{}",
        render::table(
            &["ID", "COMUNE", "FOGLIO", "PART.", "SUB", "SUPERFICIE", "SUP. CALCOLATA"],
            &rows,
        )
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    fascicolo_id: i64,
    comune: &str,
    foglio: &str,
    particella: &str,
    subalterno: Option<&str>,
    superficie_mq: f64,
    geometria: Option<&str>,
    config_path: &Path,
) -> Result<()> {
    let config = super::load(config_path)?;
    super::require_any(&config, &[Capability::FascicoloOwn, Capability::FascicoloAll])?;

    let mut payload = ParticellaCreate {
        comune: comune.to_string(),
        foglio: foglio.to_string(),
        particella: particella.to_string(),
        subalterno: subalterno.map(str::to_string),
        superficie_mq,
        superficie_calcolata_mq: None,
        coordinate_geojson: None,
        centroid_lat: None,
        centroid_lng: None,
    };

    if let Some(spec) = geometria {
        let raw = read_geometry_arg(spec)?;
        let mut sketch = ParcelSketch::new();
        sketch
            .load_geometry_str(&raw, false)
            .map_err(|e| anyhow::anyhow!("Geometria non valida: {}", e))?;

        let centroid = sketch.centroid();
        payload.coordinate_geojson = sketch.geometry_geojson();
        payload.superficie_calcolata_mq = Some(sketch.area_mq());
        payload.centroid_lat = centroid.map(|c| c.lat);
        payload.centroid_lng = centroid.map(|c| c.lng);
        println!(
            "Superficie disegnata: {} ({:.4} ha)",
            render::mq(sketch.area_mq()),
            sketch.area_mq() / 10_000.0
        );
        if let Some(c) = centroid {
            println!("Centroide: {:.6}, {:.6}", c.lat, c.lng);
        }
    }

    let created = super::api(&config)?.create_particella(&payload, fascicolo_id)?;
    println!(
        "Particella {} aggiunta: foglio {} particella {} ({})",
        created.id,
        created.foglio,
        created.particella,
        render::mq(created.superficie_mq)
    );
    Ok(())
}

/// `--geometria @file.geojson` reads from disk, anything else is inline
/// JSON.
fn read_geometry_arg(spec: &str) -> Result<String> {
    if let Some(path) = spec.strip_prefix('@') {
        Ok(std::fs::read_to_string(path)?)
    } else {
        Ok(spec.to_string())
    }
}

fn row(p: &Particella) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.comune.clone(),
        p.foglio.clone(),
        p.particella.clone(),
        render::opt(&p.subalterno),
        render::mq(p.superficie_mq),
        p.superficie_calcolata_mq
            .map(render::mq)
            .unwrap_or_else(|| "-".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_geometry_arg_inline() {
        let raw = read_geometry_arg(r#"{"type":"Polygon"}"#).unwrap();
        assert!(raw.contains("Polygon"));
    }

    #[test]
    fn test_read_geometry_arg_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type":"Polygon"}}"#).unwrap();
        let spec = format!("@{}", file.path().display());
        let raw = read_geometry_arg(&spec).unwrap();
        assert!(raw.contains("Polygon"));
    }
}
