// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::material::MaterialDescription;
use crate::materials::diffuse::DiffuseModel;
use crate::materials::microfacet::{HalfVectorSampling, MaskingFunction};
use crate::materials::standard::{BSDFConfig, StandardBSDF};
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug)]
pub enum MaterialLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
}

impl From<std::io::Error> for MaterialLoadError {
    fn from(err: std::io::Error) -> Self {
        MaterialLoadError::Io(err)
    }
}

impl fmt::Display for MaterialLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialLoadError::Io(err) => write!(f, "io error: {}", err),
            MaterialLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            MaterialLoadError::MissingField(field) => write!(f, "missing field: {}", field),
        }
    }
}

impl std::error::Error for MaterialLoadError {}

/// Named materials plus the strategy configuration they are set up with.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    pub config: BSDFConfig,
    materials: Vec<(String, MaterialDescription)>,
}

impl MaterialLibrary {
    pub fn new(config: BSDFConfig) -> Self {
        Self { config, materials: Vec::new() }
    }

    pub fn insert(&mut self, id: String, material: MaterialDescription) {
        match self.materials.iter_mut().find(|(name, _)| *name == id) {
            Some(entry) => entry.1 = material,
            None => self.materials.push((id, material)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MaterialDescription> {
        self.materials.iter().find(|(name, _)| name == id).map(|(_, m)| m)
    }

    pub fn setup(&self, id: &str) -> Option<StandardBSDF> {
        self.get(id).map(|m| self.config.setup(m))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialDescription)> {
        self.materials.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

pub fn load_material_library<P: AsRef<Path>>(path: P) -> Result<MaterialLibrary, MaterialLoadError> {
    let path = path.as_ref();
    log::info!("Loading material library from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let library = parse_material_library(&xml)?;
    log::info!("Material library loaded, {} materials, config = {:?}.", library.len(), library.config);
    Ok(library)
}

#[derive(Default)]
struct PendingBSDF {
    id: Option<String>,
    bsdf_type: String,
    floats: HashMap<String, Float>,
    spectra: HashMap<String, RGBSpectrum>,
}

impl PendingBSDF {
    fn build(self) -> Result<(String, MaterialDescription), MaterialLoadError> {
        let id = self.id.ok_or(MaterialLoadError::MissingField("bsdf.id"))?;
        let mut material = match self.bsdf_type.as_str() {
            "standard" => MaterialDescription::default(),
            "metalrough" => {
                let base = *self.spectra.get("base_color").ok_or(MaterialLoadError::MissingField("bsdf.base_color"))?;
                let roughness = self.floats.get("roughness").copied().unwrap_or(0.5);
                let metallic = self.floats.get("metallic").copied().unwrap_or(0.0);
                MaterialDescription::from_metal_rough(base, roughness, metallic)
            }
            other => return Err(MaterialLoadError::Parse(format!("unsupported bsdf type: {}", other))),
        };

        for (name, value) in self.spectra.iter() {
            match name.as_str() {
                "diffuse" => material.diffuse = *value,
                "specular" => material.specular = *value,
                "transmission" => material.transmission = *value,
                "base_color" => {}
                _ => return Err(MaterialLoadError::Parse(format!("unknown rgb parameter: {}", name))),
            }
        }
        // eta and ior describe the same quantity.
        if self.floats.contains_key("eta") && self.floats.contains_key("ior") {
            return Err(MaterialLoadError::Parse(format!("bsdf {} sets both eta and ior", id)));
        }
        for (name, value) in self.floats.iter() {
            match name.as_str() {
                "roughness" => material.linear_roughness = *value,
                "metallic" => material.metallic = *value,
                "specular_transmission" => material.specular_transmission = *value,
                "eta" => material.eta = *value,
                "ior" => {
                    if *value <= 0.0 {
                        return Err(MaterialLoadError::Parse(format!("invalid ior: {}", value)));
                    }
                    material = material.with_ior(*value, 1.0);
                }
                _ => return Err(MaterialLoadError::Parse(format!("unknown float parameter: {}", name))),
            }
        }
        if material.eta <= 0.0 || !material.eta.is_finite() {
            return Err(MaterialLoadError::Parse(format!("invalid eta for {}: {}", id, material.eta)));
        }
        Ok((id, material))
    }
}

pub fn parse_material_library(xml: &str) -> Result<MaterialLibrary, MaterialLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut library = MaterialLibrary::new(BSDFConfig::default());
    let mut current: Option<PendingBSDF> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                read_element(&e, false, &mut defaults, &mut library, &mut current)?;
            }
            // Self-closing elements never produce an End event.
            Ok(Event::Empty(e)) => {
                read_element(&e, true, &mut defaults, &mut library, &mut current)?;
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"bsdf" {
                    let pending = current.take()
                        .ok_or_else(|| MaterialLoadError::Parse("unmatched </bsdf>".to_string()))?;
                    let (id, material) = pending.build()?;
                    log::debug!("Loaded bsdf {}: {:?}", id, material);
                    library.insert(id, material);
                }
            }
            Err(e) => {
                return Err(MaterialLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if current.is_some() {
        return Err(MaterialLoadError::Parse("unterminated bsdf".to_string()));
    }

    Ok(library)
}

fn read_element(e: &BytesStart,
                self_closing: bool,
                defaults: &mut HashMap<String, String>,
                library: &mut MaterialLibrary,
                current: &mut Option<PendingBSDF>) -> Result<(), MaterialLoadError> {
    match e.name().as_ref() {
        b"default" => {
            let attrs = attributes(e, defaults)?;
            if let (Some(k), Some(v)) = (attrs.get("name"), attrs.get("value")) {
                defaults.insert(k.clone(), v.clone());
            }
        }
        b"config" => {
            let attrs = attributes(e, defaults)?;
            library.config = parse_config(&attrs, library.config)?;
        }
        b"bsdf" => {
            if current.is_some() {
                return Err(MaterialLoadError::Parse("nested bsdf".to_string()));
            }
            let attrs = attributes(e, defaults)?;
            let pending = PendingBSDF {
                id: attrs.get("id").cloned(),
                bsdf_type: attrs.get("type").cloned().unwrap_or_else(|| "standard".to_string()),
                ..Default::default()
            };
            if self_closing {
                let (id, material) = pending.build()?;
                library.insert(id, material);
            } else {
                *current = Some(pending);
            }
        }
        b"float" | b"rgb" => {
            let pending = current.as_mut()
                .ok_or_else(|| MaterialLoadError::Parse("parameter outside of bsdf".to_string()))?;
            let attrs = attributes(e, defaults)?;
            let name = attrs.get("name").cloned().ok_or(MaterialLoadError::MissingField("parameter.name"))?;
            let value = attrs.get("value").ok_or(MaterialLoadError::MissingField("parameter.value"))?;
            if e.name().as_ref() == b"float" {
                pending.floats.insert(name, parse_float(value)?);
            } else {
                pending.spectra.insert(name, parse_spectrum(value)?);
            }
        }
        b"library" => {}
        other => {
            log::warn!("Ignoring unknown element <{}>.", String::from_utf8_lossy(other));
        }
    }
    Ok(())
}

fn attributes(e: &BytesStart, defaults: &HashMap<String, String>) -> Result<HashMap<String, String>, MaterialLoadError> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MaterialLoadError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|err| MaterialLoadError::Parse(err.to_string()))?;
        out.insert(key, resolve_value(&value, defaults));
    }
    Ok(out)
}

fn parse_config(attrs: &HashMap<String, String>, mut config: BSDFConfig) -> Result<BSDFConfig, MaterialLoadError> {
    if let Some(diffuse) = attrs.get("diffuse") {
        config.diffuse = match diffuse.as_str() {
            "lambert" => DiffuseModel::Lambert,
            "disney" => DiffuseModel::Disney,
            "frostbite" => DiffuseModel::Frostbite,
            other => return Err(MaterialLoadError::Parse(format!("unknown diffuse model: {}", other))),
        };
    }
    if let Some(masking) = attrs.get("masking") {
        config.masking = match masking.as_str() {
            "separable" => MaskingFunction::SmithGGXSeparable,
            "correlated" => MaskingFunction::SmithGGXCorrelated,
            other => return Err(MaterialLoadError::Parse(format!("unknown masking function: {}", other))),
        };
    }
    if let Some(sampling) = attrs.get("sampling") {
        config.sampling = match sampling.as_str() {
            "ndf" => HalfVectorSampling::Ndf,
            "vndf" => HalfVectorSampling::Vndf,
            other => return Err(MaterialLoadError::Parse(format!("unknown sampling strategy: {}", other))),
        };
    }
    Ok(config)
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, MaterialLoadError> {
    value.trim().parse::<Float>().map_err(|_| MaterialLoadError::Parse(format!("invalid float: {}", value)))
}

// Accepts "r g b", "r, g, b" or a single gray value.
fn parse_spectrum(value: &str) -> Result<RGBSpectrum, MaterialLoadError> {
    let parts: Vec<&str> = value.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    match parts.len() {
        1 => Ok(RGBSpectrum::splat(parse_float(parts[0])?)),
        3 => Ok(RGBSpectrum::new(parse_float(parts[0])?, parse_float(parts[1])?, parse_float(parts[2])?)),
        _ => Err(MaterialLoadError::Parse(format!("invalid rgb: {}", value))),
    }
}
