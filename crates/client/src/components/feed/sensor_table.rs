//! Sensor table - one row per sensor of the latest reading.

use std::sync::Arc;

use capteur_shared::{Reading, SensorReading};
use dioxus::prelude::*;

/// CSS class of the value cell.
pub fn value_class(reading: &SensorReading) -> &'static str {
    match reading {
        SensorReading::Measurement { .. } => "measurement",
        SensorReading::Boolean { value: true } => "boolean on",
        SensorReading::Boolean { value: false } => "boolean",
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct SensorTableProps {
    pub reading: Arc<Reading>,
}

#[component]
pub fn SensorTable(props: SensorTableProps) -> Element {
    rsx! {
        table { class: "sensors",
            thead {
                tr {
                    th { "Name" }
                    th { "Value" }
                }
            }
            tbody {
                for (name, value) in props.reading.sensors.iter() {
                    SensorRow { key: "{name}", name: name.clone(), value: value.clone() }
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct SensorRowProps {
    pub name: String,
    pub value: SensorReading,
}

#[component]
pub fn SensorRow(props: SensorRowProps) -> Element {
    let class = value_class(&props.value);
    let name = &props.name;
    let shown = props.value.to_string();

    rsx! {
        tr {
            td { "{name}" }
            td { class, "{shown}" }
        }
    }
}
