// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use autodex_app::{Catalog, Make, MakeId, Model, Trim, TrimId};
use std::fs;
use std::path::{Path, PathBuf};

const MAKE_NAMES: [&str; 16] = [
    "Alfa Romeo",
    "Audi",
    "BMW",
    "Chevrolet",
    "Citroen",
    "Dodge",
    "Fiat",
    "Ford",
    "Honda",
    "Lancia",
    "Mazda",
    "Nissan",
    "Peugeot",
    "Subaru",
    "Toyota",
    "Volvo",
];

const MODEL_NAMES: [&str; 18] = [
    "Accord", "Alpine", "Bravo", "Capri", "Civic", "Delta", "Escort", "Fiesta", "Golf", "Impreza",
    "Legacy", "Miata", "Mustang", "Prelude", "Rally", "Sierra", "Supra", "Tipo",
];

const TRIM_LABELS: [&str; 10] = [
    "GT", "GTi", "LX", "EX", "Si", "Sport", "Touring", "Turbo", "Type R", "Limited",
];

const ENGINE_TYPES: [&str; 5] = ["Inline-4", "Inline-6", "V6", "V8", "Flat-4"];
const BODY_STYLES: [&str; 5] = ["Sedan", "Coupe", "Hatchback", "Wagon", "Convertible"];
const DRIVES: [&str; 3] = ["Front", "Rear", "AWD"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Generates reproducible catalogs for property-style tests.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    /// A catalog with up to `makes` makes, each with 1..=`max_models` models
    /// of 1..=`max_trims` trims. Ids are unique within their scope; names may
    /// differ in case so ordering and keyword folding get exercised.
    pub fn catalog(&mut self, makes: usize, max_models: usize, max_trims: usize) -> Catalog {
        let mut make_names = MAKE_NAMES.to_vec();
        let mut result = Vec::new();
        for make_index in 0..makes.min(MAKE_NAMES.len()) {
            let name = make_names.remove(self.rng.int_n(make_names.len()));
            let mut model_names = MODEL_NAMES.to_vec();
            let model_count = 1 + self.rng.int_n(max_models.clamp(1, MODEL_NAMES.len()));
            let mut models = Vec::with_capacity(model_count);
            for _ in 0..model_count {
                let model_name = model_names.remove(self.rng.int_n(model_names.len()));
                let trim_count = 1 + self.rng.int_n(max_trims.max(1));
                let trims = (0..trim_count)
                    .map(|trim_index| Trim {
                        id: TrimId::new(format!("{make_index}-{model_name}-{trim_index}")),
                        year: 1960 + self.rng.int_n(66) as i32,
                        label: self.rng.bool().then(|| self.pick(&TRIM_LABELS).to_owned()),
                    })
                    .collect();
                models.push(Model {
                    name: if self.rng.int_n(5) == 0 {
                        model_name.to_lowercase()
                    } else {
                        model_name.to_owned()
                    },
                    trims,
                });
            }
            result.push(Make {
                id: MakeId::new(slug(name)),
                name: name.to_owned(),
                models,
            });
        }
        Catalog::new(result)
    }

    /// A detail table JSON document covering every trim of `make`.
    pub fn detail_json(&mut self, make: &Make) -> String {
        let mut table = serde_json::Map::new();
        for model in &make.models {
            for trim in &model.trims {
                let mut record = serde_json::Map::new();
                record.insert("model_year".to_owned(), trim.year.to_string().into());
                record.insert("make_display".to_owned(), make.name.clone().into());
                record.insert("model_name".to_owned(), model.name.clone().into());
                record.insert(
                    "model_engine_type".to_owned(),
                    self.pick(&ENGINE_TYPES).into(),
                );
                record.insert(
                    "model_engine_power_hp".to_owned(),
                    (80 + self.rng.int_n(400)).to_string().into(),
                );
                record.insert("model_body".to_owned(), self.pick(&BODY_STYLES).into());
                record.insert("model_drive".to_owned(), self.pick(&DRIVES).into());
                record.insert(
                    "model_sold_in_us".to_owned(),
                    if self.rng.bool() { "Yes" } else { "No" }.into(),
                );
                table.insert(trim.id.as_str().to_owned(), record.into());
            }
        }
        serde_json::Value::Object(table).to_string()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// The single-make catalog used throughout the docs: a 2020 Civic without a
/// trim label and a 2022 Civic Si.
pub fn honda_catalog() -> Catalog {
    Catalog::new(vec![honda()])
}

pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        honda(),
        Make {
            id: MakeId::from("toyota"),
            name: "Toyota".to_owned(),
            models: vec![
                Model {
                    name: "Supra".to_owned(),
                    trims: vec![
                        trim("supra-94", 1994, Some("Turbo")),
                        trim("supra-20", 2020, None),
                    ],
                },
                Model {
                    name: "Corolla".to_owned(),
                    trims: vec![
                        trim("corolla-01", 2001, None),
                        trim("corolla-19", 2019, Some("SE")),
                    ],
                },
            ],
        },
        Make {
            id: MakeId::from("audi"),
            name: "Audi".to_owned(),
            models: vec![Model {
                name: "A4".to_owned(),
                trims: vec![trim("a4-15", 2015, Some("quattro"))],
            }],
        },
    ])
}

/// Detail JSON for the Honda fixture. The 2022 Si reports zero horsepower so
/// the zero-sentinel path is exercised.
pub fn honda_detail_json() -> &'static str {
    r#"{
  "c1": {
    "model_year": "2020",
    "make_display": "Honda",
    "model_name": "Civic",
    "model_engine_type": "Inline-4",
    "model_engine_power_hp": "158",
    "model_body": "Sedan",
    "model_sold_in_us": "Yes"
  },
  "c2": {
    "model_year": "2022",
    "make_display": "Honda",
    "model_name": "Civic",
    "model_engine_type": "Inline-4 Turbo",
    "model_engine_power_hp": "0",
    "model_engine_torque_nm": 260,
    "model_transmission_type": "None",
    "model_drive": "Front",
    "model_doors": 2
  }
}"#
}

pub fn catalog_json(catalog: &Catalog) -> Result<String> {
    serde_json::to_string(catalog.makes()).context("encode catalog index")
}

/// Writes `index.json` and `details/<make>.json` files under `root`, the
/// layout the directory and HTTP sources both read.
pub fn write_data_dir(root: &Path, catalog: &Catalog, details: &[(&str, &str)]) -> Result<()> {
    fs::create_dir_all(root.join("details"))
        .with_context(|| format!("create details dir under {}", root.display()))?;
    fs::write(root.join("index.json"), catalog_json(catalog)?)
        .with_context(|| format!("write index under {}", root.display()))?;
    for (make_id, body) in details {
        let path = root.join("details").join(format!("{make_id}.json"));
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

pub fn temp_data_dir(
    catalog: &Catalog,
    details: &[(&str, &str)],
) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let root = dir.path().join("web_data");
    write_data_dir(&root, catalog, details)?;
    Ok((dir, root))
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("autodex.db");
    Ok((dir, db_path))
}

fn honda() -> Make {
    Make {
        id: MakeId::from("honda"),
        name: "Honda".to_owned(),
        models: vec![Model {
            name: "Civic".to_owned(),
            trims: vec![trim("c1", 2020, None), trim("c2", 2022, Some("Si"))],
        }],
    }
}

fn trim(id: &str, year: i32, label: Option<&str>) -> Trim {
    Trim {
        id: TrimId::from(id),
        year,
        label: label.map(str::to_owned),
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}
