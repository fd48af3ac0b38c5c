//! Vehicle fixture shared by the integration tests.
//!
//! Kinds: `Vehicle` (Car, Truck), `engine` (Combustion, Electric) and
//! `trailer` (Container). Cars build their engine eagerly; trucks keep the
//! trailer document and build it on demand.

#![allow(dead_code)]

use hyperspace_core::{into_document, Document, Params, Registry, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub trait Vehicle {
    fn mpge(&self, registry: &Registry) -> Result<f64>;
    fn doors(&self) -> Option<u32> {
        None
    }
}

pub trait Engine {
    fn efficiency(&self) -> f64;
}

pub trait Trailer {
    fn drag(&self) -> f64;
}

pub struct Car {
    pub engine: Box<dyn Engine>,
    pub num_doors: u32,
}

impl Vehicle for Car {
    fn mpge(&self, _: &Registry) -> Result<f64> {
        Ok(self.engine.efficiency() * 100.0)
    }

    fn doors(&self) -> Option<u32> {
        Some(self.num_doors)
    }
}

pub struct Truck {
    pub engine: Box<dyn Engine>,
    pub trailer: Document,
}

impl Vehicle for Truck {
    fn mpge(&self, registry: &Registry) -> Result<f64> {
        let trailer: Box<dyn Trailer> = registry.build(&self.trailer, "trailer")?;
        Ok((10.0 - trailer.drag()) * self.engine.efficiency())
    }
}

pub struct Combustion {
    pub displacement: f64,
    pub strokes_per_cycle: u32,
}

impl Engine for Combustion {
    fn efficiency(&self) -> f64 {
        f64::from(self.strokes_per_cycle) / 10.0 - self.displacement / 50.0
    }
}

pub struct Electric;

impl Engine for Electric {
    fn efficiency(&self) -> f64 {
        0.9
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub height: f64,
    pub length: f64,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            height: 3.0,
            length: 10.0,
        }
    }
}

impl Trailer for Container {
    fn drag(&self) -> f64 {
        self.height * self.length / 10.0
    }
}

pub fn doc(value: Value) -> Document {
    into_document(value, "").expect("fixture must be a document")
}

pub fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .register_kind::<Box<dyn Vehicle>>("Vehicle")
        .unwrap()
        .register_kind::<Box<dyn Engine>>("engine")
        .unwrap()
        .register_kind::<Box<dyn Trailer>>("trailer")
        .unwrap();

    builder
        .register_implementation(
            "Vehicle",
            "Car",
            |params: &mut Params<'_>| {
                let car: Box<dyn Vehicle> = Box::new(Car {
                    engine: params.build("engine")?,
                    num_doors: params.take("numDoors")?,
                });
                Ok(car)
            },
            || doc(json!({"numDoors": 4})),
        )
        .unwrap()
        .register_implementation(
            "Vehicle",
            "Truck",
            |params: &mut Params<'_>| {
                let truck: Box<dyn Vehicle> = Box::new(Truck {
                    engine: params.build("engine")?,
                    trailer: params.take_document("trailer")?,
                });
                Ok(truck)
            },
            || doc(json!({"trailer": {"className": "Container"}})),
        )
        .unwrap();

    builder
        .register_implementation(
            "engine",
            "Combustion",
            |params: &mut Params<'_>| {
                let displacement: f64 = params.take("displacement")?;
                if displacement <= 0.0 {
                    anyhow::bail!("displacement must be positive, got {displacement}");
                }
                let engine: Box<dyn Engine> = Box::new(Combustion {
                    displacement,
                    strokes_per_cycle: params.take("strokesPerCycle")?,
                });
                Ok(engine)
            },
            || doc(json!({"strokesPerCycle": 4})),
        )
        .unwrap()
        .register_implementation(
            "engine",
            "Electric",
            |_: &mut Params<'_>| {
                let engine: Box<dyn Engine> = Box::new(Electric);
                Ok(engine)
            },
            Document::new,
        )
        .unwrap();

    builder
        .register_serde("trailer", "Container", |c: Container| -> Box<dyn Trailer> {
            Box::new(c)
        })
        .unwrap();

    builder.finish()
}

/// Scenario 1 base: a car with a combustion engine, door count set.
pub fn car() -> Document {
    doc(json!({
        "className": "Car",
        "numDoors": 4,
        "engine": {"className": "Combustion", "displacement": 2.0}
    }))
}

pub fn truck() -> Document {
    doc(json!({
        "className": "Truck",
        "engine": {"className": "Electric"}
    }))
}
