//! Input normalization
//!
//! Every entry point accepts GeoJSON in several shapes (an in-memory value, a
//! file path, a URL, or anything exposing a geo interface) and works on a single
//! canonical FeatureCollection.

use crate::error::{Error, Result};
use crate::models::GeometryType;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

const GEOJSON_EXTENSIONS: [&str; 2] = ["json", "geojson"];
const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// A GeoJSON source
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJsonInput {
    /// An already parsed GeoJSON value
    Json(Value),
    /// A `.json` or `.geojson` file on disk
    Path(PathBuf),
    /// A remote `.json` or `.geojson` document
    Url(String),
}

impl GeoJsonInput {
    /// Classify a command line argument as URL or file path
    pub fn parse(source: &str) -> Self {
        if is_url(source) {
            GeoJsonInput::Url(source.to_string())
        } else {
            GeoJsonInput::Path(PathBuf::from(source))
        }
    }

    /// Build an input from any value exposing a geo interface
    pub fn from_interface<G: GeoInterface + ?Sized>(source: &G) -> Result<Self> {
        Ok(GeoJsonInput::Json(source.geo_interface()?))
    }
}

impl From<Value> for GeoJsonInput {
    fn from(value: Value) -> Self {
        GeoJsonInput::Json(value)
    }
}

/// Anything that can describe itself as a GeoJSON value
pub trait GeoInterface {
    fn geo_interface(&self) -> Result<Value>;
}

impl GeoInterface for geojson::GeoJson {
    fn geo_interface(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl GeoInterface for geojson::FeatureCollection {
    fn geo_interface(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl GeoInterface for geojson::Feature {
    fn geo_interface(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl GeoInterface for geojson::Geometry {
    fn geo_interface(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl GeoInterface for geo::Geometry<f64> {
    fn geo_interface(&self) -> Result<Value> {
        let geometry = geojson::Geometry::new(geojson::Value::from(self));
        Ok(serde_json::to_value(&geometry)?)
    }
}

/// Port for retrieving remote GeoJSON documents
pub trait RemoteFetcher {
    fn fetch(&self, url: &str) -> Result<Value>;
}

fn is_url(source: &str) -> bool {
    source
        .split_once("://")
        .map(|(scheme, _)| URL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn has_geojson_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| GEOJSON_EXTENSIONS.iter().any(|g| ext.eq_ignore_ascii_case(g)))
        .unwrap_or(false)
}

fn require_geojson_extension(source: &str, path: &Path) -> Result<()> {
    if has_geojson_extension(path) {
        Ok(())
    } else {
        Err(Error::UnsupportedInput {
            reason: format!("Filepath or URL must be a geojson or json file: {}", source),
        })
    }
}

/// Read the input into a JSON value without checking its shape
pub fn read_geojson(input: GeoJsonInput, fetcher: Option<&dyn RemoteFetcher>) -> Result<Value> {
    let value = match input {
        GeoJsonInput::Json(value) => value,
        GeoJsonInput::Path(path) => {
            require_geojson_extension(&path.display().to_string(), &path)?;
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        }
        GeoJsonInput::Url(url) => {
            // Strip query and fragment before looking at the extension
            let location = url.split(['?', '#']).next().unwrap_or(&url);
            require_geojson_extension(&url, Path::new(location))?;
            let fetcher = fetcher.ok_or_else(|| Error::UnsupportedInput {
                reason: format!("No remote fetcher configured for URL input: {}", url),
            })?;
            tracing::info!("Fetching GeoJSON from {}", url);
            fetcher.fetch(&url)?
        }
    };
    Ok(value)
}

/// Read the input into a GeoJSON value without reshaping it
pub fn load_geojson(input: GeoJsonInput, fetcher: Option<&dyn RemoteFetcher>) -> Result<Value> {
    let value = read_geojson(input, fetcher)?;
    match value.get("type") {
        Some(_) => Ok(value),
        None => Err(Error::UnsupportedInput {
            reason: "Input must be a GeoJSON object with a 'type' member, a filepath/url to a \
                     GeoJSON, or a value with a geo interface"
                .to_string(),
        }),
    }
}

/// Wrap a FeatureCollection, Feature or bare geometry into a FeatureCollection
pub fn to_feature_collection(geojson: &Value) -> Result<Value> {
    let type_name = geojson
        .get("type")
        .ok_or(Error::MissingType { index: 0 })?
        .as_str()
        .ok_or_else(|| Error::UnsupportedType { type_name: geojson["type"].to_string() })?;

    match type_name {
        "FeatureCollection" => Ok(geojson.clone()),
        "Feature" => Ok(json!({
            "type": "FeatureCollection",
            "features": [geojson],
        })),
        other if other.parse::<GeometryType>().is_ok() => Ok(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": geojson,
            }],
        })),
        other => Err(Error::UnsupportedType { type_name: other.to_string() }),
    }
}

/// Load any supported input and return it as a FeatureCollection
pub fn normalize(input: GeoJsonInput, fetcher: Option<&dyn RemoteFetcher>) -> Result<Value> {
    let geojson = load_geojson(input, fetcher)?;
    to_feature_collection(&geojson)
}
