// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV and XLSX export of weather logs.

use crate::error::AppError;
use crate::models::WeatherLog;
use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_FILENAME: &str = "weather-export.csv";
pub const XLSX_FILENAME: &str = "weather-export.xlsx";

const HEADERS: [&str; 4] = ["timestamp", "temperature", "humidity", "city"];
const COLUMN_WIDTHS: [f64; 4] = [25.0, 15.0, 15.0, 20.0];
const SHEET_NAME: &str = "Weather Logs";
const HEADER_FILL: u32 = 0xE0E0E0;

fn csv_error(reason: impl ToString) -> AppError {
    AppError::Export {
        format: "CSV",
        reason: reason.to_string(),
    }
}

fn xlsx_error(e: XlsxError) -> AppError {
    AppError::Export {
        format: "XLSX",
        reason: e.to_string(),
    }
}

/// Render logs (in the given order) as CSV with a header row.
pub fn export_csv(logs: &[WeatherLog]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(HEADERS).map_err(csv_error)?;

    for log in logs {
        let temperature = log.temperature.to_string();
        let humidity = log.humidity.to_string();
        writer
            .write_record([
                log.timestamp.as_str(),
                temperature.as_str(),
                humidity.as_str(),
                log.city_or_empty(),
            ])
            .map_err(csv_error)?;
    }

    writer.into_inner().map_err(csv_error)
}

/// Render logs as a single-sheet XLSX workbook.
pub fn export_xlsx(logs: &[WeatherLog]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, width).map_err(xlsx_error)?;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(xlsx_error)?;
    }

    for (i, log) in logs.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet
            .write_string(row, 0, &log.timestamp)
            .map_err(xlsx_error)?;
        worksheet
            .write_number(row, 1, log.temperature)
            .map_err(xlsx_error)?;
        worksheet
            .write_number(row, 2, log.humidity)
            .map_err(xlsx_error)?;
        worksheet
            .write_string(row, 3, log.city_or_empty())
            .map_err(xlsx_error)?;
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(timestamp: &str, temperature: f64, humidity: f64, city: Option<&str>) -> WeatherLog {
        WeatherLog {
            id: "id".to_string(),
            timestamp: timestamp.to_string(),
            temperature,
            humidity,
            city: city.map(str::to_string),
            created_at: timestamp.to_string(),
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let logs = vec![
            log("2025-01-24T11:00:00Z", 25.5, 70.0, Some("Recife")),
            log("2025-01-24T10:00:00Z", 24.0, 65.5, None),
        ];

        let csv = String::from_utf8(export_csv(&logs).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "timestamp,temperature,humidity,city");
        assert_eq!(lines[1], "2025-01-24T11:00:00Z,25.5,70,Recife");
        assert_eq!(lines[2], "2025-01-24T10:00:00Z,24,65.5,");
    }

    #[test]
    fn test_csv_escapes_special_characters() {
        let logs = vec![log(
            "2025-01-24T10:00:00Z",
            20.0,
            50.0,
            Some("São Paulo, \"SP\""),
        )];

        let csv = String::from_utf8(export_csv(&logs).unwrap()).unwrap();

        assert!(csv.contains("\"São Paulo, \"\"SP\"\"\""));
    }

    #[test]
    fn test_csv_empty_has_header_only() {
        let csv = String::from_utf8(export_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "timestamp,temperature,humidity,city");
    }

    #[test]
    fn test_xlsx_produces_zip_container() {
        let logs = vec![log("2025-01-24T10:00:00Z", 20.0, 50.0, Some("Lima"))];
        let bytes = export_xlsx(&logs).unwrap();

        // XLSX files are ZIP archives.
        assert!(bytes.starts_with(b"PK"));
    }
}
