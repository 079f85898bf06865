// CSV import - bulk-load entries from a `category,price` file

use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::db::NewEntry;
use crate::error::ImportError;

/// Read entries from a CSV file with a `category,price` header row.
pub fn load_csv(csv_path: &Path) -> Result<Vec<NewEntry>, ImportError> {
    let rdr = csv::Reader::from_path(csv_path)?;
    let entries = collect_entries(rdr)?;

    info!(path = %csv_path.display(), count = entries.len(), "loaded entries from CSV");
    Ok(entries)
}

/// Same as [`load_csv`] but from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<NewEntry>, ImportError> {
    collect_entries(csv::Reader::from_reader(reader))
}

fn collect_entries<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<NewEntry>, ImportError> {
    let mut entries = Vec::new();

    for result in rdr.deserialize() {
        let entry: NewEntry = result?;
        entries.push(entry);
    }

    Ok(entries)
}
