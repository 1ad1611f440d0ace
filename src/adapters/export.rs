use crate::domain::board::Board;
use crate::domain::model::SignalRow;
use crate::domain::ports::{BoardSink, Storage};
use crate::utils::error::{DashError, Result};
use async_trait::async_trait;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SNAPSHOT_FILE: &str = "signals_snapshot.zip";
pub const CSV_ENTRY: &str = "signals.csv";
pub const JSON_ENTRY: &str = "signals.json";

/// 看板中篩選後的卡片，依呈現順序轉成扁平列
pub fn board_rows(board: &Board) -> Vec<SignalRow> {
    board.cards().map(SignalRow::from).collect()
}

pub fn rows_to_csv(rows: &[SignalRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashError::IoError(e.into_error()))
}

/// 打包 signals.csv 與 signals.json
pub fn snapshot_archive(board: &Board) -> Result<Vec<u8>> {
    let rows = board_rows(board);
    let csv_data = rows_to_csv(&rows)?;
    let json_data = serde_json::to_vec_pretty(board)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file(CSV_ENTRY, options)?;
    zip.write_all(&csv_data)?;

    zip.start_file(JSON_ENTRY, options)?;
    zip.write_all(&json_data)?;

    Ok(zip.finish()?.into_inner())
}

/// 把每次掃描的看板寫成壓縮快照
pub struct ZipExportSink<S: Storage> {
    storage: S,
}

impl<S: Storage> ZipExportSink<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> BoardSink for ZipExportSink<S> {
    async fn publish(&self, board: &Board) -> Result<()> {
        let archive = snapshot_archive(board)?;
        tracing::debug!(
            "Creating {} with {} signals ({} bytes)",
            SNAPSHOT_FILE,
            board.shown,
            archive.len()
        );
        self.storage.write_file(SNAPSHOT_FILE, &archive).await?;
        tracing::info!("💾 Snapshot saved: {} signals in {}", board.shown, SNAPSHOT_FILE);
        Ok(())
    }
}
