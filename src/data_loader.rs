//! Загрузка датасета: таблица Excel (.xlsx) или CSV-выгрузка

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, RangeDeserializer, RangeDeserializerBuilder, Reader, Xlsx};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::types::{CustomerRecord, Dataset, ALL_COLUMNS};

/// Формат выбирается по расширению: .xlsx/.xlsm читаются как книга Excel, остальное как CSV
pub fn load_data<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let dataset = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => read_workbook(BufReader::new(file))?,
        _ => read_dataset(BufReader::new(file))?,
    };

    debug!(rows = dataset.len(), path = %path.display(), "Dataset loaded");
    Ok(dataset)
}

pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_headers(&headers.iter().collect::<Vec<_>>())?;

    let mut records = Vec::new();
    for result in rdr.deserialize::<CustomerRecord>() {
        records.push(result?);
    }

    Ok(Dataset::new(records))
}

/// Первый лист книги; первая строка листа - заголовки
pub fn read_workbook<RS: Read + Seek>(reader: RS) -> Result<Dataset> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader).map_err(calamine::Error::from)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PipelineError::EmptyDataset)?
        .map_err(calamine::Error::from)?;

    let headers: Vec<String> = range
        .rows()
        .next()
        .ok_or(PipelineError::EmptyDataset)?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    check_headers(&headers.iter().map(String::as_str).collect::<Vec<_>>())?;

    let rows: RangeDeserializer<'_, Data, CustomerRecord> =
        RangeDeserializerBuilder::new().from_range(&range)?;
    let mut records = Vec::new();
    for result in rows {
        records.push(result?);
    }

    Ok(Dataset::new(records))
}

fn check_headers(headers: &[&str]) -> Result<()> {
    for column in ALL_COLUMNS {
        if !headers.contains(&column) {
            return Err(PipelineError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Customer Name,Customer e-mail,Country,Gender,Age,Annual Salary,Credit Card Debt,Net Worth,Car Purchase Amount";

    #[test]
    fn test_load_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Martina Avila,cubilia@nisi.com,Bulgaria,0,41.85,62812.09,11609.38,238961.25,35321.45").unwrap();
        writeln!(file, "Harlan Barnes,eu@pede.net,Belize,0,40.87,66646.89,9572.95,530973.90,45115.52").unwrap();

        let data = load_data(file.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.shape(), (2, 9));
        assert_eq!(data.records()[0].country, "Bulgaria");
        assert!((data.records()[1].annual_salary.unwrap() - 66646.89).abs() < 1e-9);
    }

    #[test]
    fn empty_cells_become_nulls() {
        let csv = format!("{}\nA,a@b.c,X,1,,50000,100,2000,30000\n", HEADER);
        let data = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(data.records()[0].age, None);
        assert_eq!(data.records()[0].gender, Some(1.0));
    }

    #[test]
    fn column_order_is_free() {
        let csv = "Car Purchase Amount,Net Worth,Credit Card Debt,Annual Salary,Age,Gender,Country,Customer e-mail,Customer Name\n\
                   30000,2000,100,50000,30,1,X,a@b.c,A\n";
        let data = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(data.records()[0].car_purchase_amount, Some(30000.0));
        assert_eq!(data.records()[0].customer_name, "A");
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Customer Name,Gender\nA,1\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "Customer e-mail"));
    }

    #[test]
    fn non_numeric_cell_fails() {
        let csv = format!("{}\nA,a@b.c,X,male,30,50000,100,2000,30000\n", HEADER);
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(PipelineError::Csv(_))
        ));
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
    }

    #[test]
    fn test_load_xlsx() {
        let data = load_data(fixture("customers.xlsx")).unwrap();
        assert_eq!(data.shape(), (3, 9));

        let first = &data.records()[0];
        assert_eq!(first.customer_name, "Martina Avila");
        assert_eq!(first.country, "Bulgaria");
        assert_eq!(first.gender, Some(0.0));
        assert!((first.annual_salary.unwrap() - 62812.09301).abs() < 1e-9);
        assert!((first.car_purchase_amount.unwrap() - 35321.45877).abs() < 1e-9);
    }

    #[test]
    fn empty_xlsx_cell_becomes_null() {
        let data = load_data(fixture("customers.xlsx")).unwrap();
        let last = &data.records()[2];
        assert_eq!(last.age, None);
        assert_eq!(last.gender, Some(1.0));
        assert!(last.net_worth.is_some());
    }

    #[test]
    fn xlsx_and_csv_give_same_records() {
        let csv = format!(
            "{}\nMartina Avila,cubilia.Curae.Phasellus@quisaccumsanconvallis.edu,Bulgaria,0,41.8517198,62812.09301,11609.38091,238961.2505,35321.45877\n",
            HEADER
        );
        let from_csv = read_dataset(csv.as_bytes()).unwrap();
        let from_xlsx = load_data(fixture("customers.xlsx")).unwrap();
        assert_eq!(from_csv.records()[0], from_xlsx.records()[0]);
    }

    #[test]
    fn broken_workbook_fails() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        assert!(matches!(
            load_data(file.path()),
            Err(PipelineError::Spreadsheet(_))
        ));
    }

    #[test]
    fn missing_file_fails() {
        assert!(matches!(
            load_data("/no/such/Car_Purchasing_Data.csv"),
            Err(PipelineError::Io { .. })
        ));
    }
}
