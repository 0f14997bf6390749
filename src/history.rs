//! Append-only log of calculated repairs

use tracing::info;

use crate::error::Result;
use crate::export::write_csv;
use crate::models::HistoryEntry;

pub const HISTORY_COLUMNS: [&str; 16] = [
    "Date",
    "JobOrder",
    "Brand",
    "MachineModel",
    "MachineSerial",
    "CustomerPrefix",
    "CylinderName",
    "CylinderSerial",
    "PipeNumber",
    "RodNumber",
    "PistonNumber",
    "HeadNumber",
    "MaterialsCostLocal",
    "LaborCostLocal",
    "FinalPriceLocal",
    "FinalPriceUsd",
];

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, Default)]
pub struct RepairHistory {
    entries: Vec<HistoryEntry>,
}

impl RepairHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry at the end; duplicates are kept
    pub fn append(&mut self, entry: HistoryEntry) {
        info!(
            job_order = %entry.job.job_order,
            final_price = entry.final_price_local,
            "Recorded repair quote"
        );
        self.entries.push(entry);
    }

    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry in append order as BOM-prefixed CSV
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        let records = self
            .entries
            .iter()
            .map(|e| {
                let job = &e.job;
                vec![
                    e.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    job.job_order.clone(),
                    job.brand.clone(),
                    job.machine_model.clone(),
                    job.machine_serial.clone(),
                    job.customer_prefix.clone(),
                    job.cylinder_name.clone(),
                    job.cylinder_serial.clone(),
                    job.pipe_number.clone(),
                    job.rod_number.clone(),
                    job.piston_number.clone(),
                    job.head_number.clone(),
                    e.materials_cost.to_string(),
                    e.labor_cost.to_string(),
                    e.final_price_local.to_string(),
                    e.final_price_usd.to_string(),
                ]
            })
            .collect();

        write_csv(&HISTORY_COLUMNS, records)
    }
}
