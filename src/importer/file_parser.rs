// ==========================================
// 表格数据导入核心 - 文件解析器实现
// ==========================================
// 职责: 字节流 → 原始行（尚未做任何字段转换）
// 支持: 分隔文本 (Csv) / 旧版二进制电子表格 (Xls) / XML-zip 电子表格 (Xlsx)
// ==========================================

use crate::config::ImportConfiguration;
use crate::domain::types::FileDataType;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::raw_row::{CsvRow, HeaderIndex, RawRow, RawValue, SheetRow};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use std::io::{Cursor, Read, Seek};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser {
    type Row: RawRow;

    /// 解析器名称（用于日志）
    fn name(&self) -> &'static str;

    /// 是否能处理该格式
    fn supports(&self, data_type: FileDataType) -> bool;

    /// 解析字节流为原始行
    ///
    /// # 参数
    /// - data_type: 调用方声明的格式
    /// - data: 字节流（读取完毕即释放）
    /// - config: 工作表筛选 + 表头标志
    ///
    /// # 返回
    /// - Ok(Vec<Row>): 按源顺序排列的原始行
    /// - Err(UnsupportedSourceKind): 格式与解析器能力不符
    fn parse_rows<R: Read>(
        &self,
        data_type: FileDataType,
        data: R,
        config: &ImportConfiguration,
    ) -> ImportResult<Vec<Self::Row>>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl FileParser for CsvParser {
    type Row = CsvRow;

    fn name(&self) -> &'static str {
        "csv"
    }

    fn supports(&self, data_type: FileDataType) -> bool {
        data_type == FileDataType::Csv
    }

    fn parse_rows<R: Read>(
        &self,
        data_type: FileDataType,
        data: R,
        config: &ImportConfiguration,
    ) -> ImportResult<Vec<CsvRow>> {
        if !self.supports(data_type) {
            return Err(ImportError::UnsupportedSourceKind(data_type));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(config.first_row_has_headers)
            .flexible(true) // 允许行长度不一致
            .trim(Trim::All)
            .from_reader(data);

        // 读取表头
        let headers = if config.first_row_has_headers {
            let names = reader.headers()?.iter().map(str::to_string).collect();
            Arc::new(HeaderIndex::new(names))
        } else {
            Arc::new(HeaderIndex::default())
        };

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;

            // 跳过完全空白的行
            if record.iter().all(str::is_empty) {
                continue;
            }

            let fields = record.iter().map(str::to_string).collect();
            rows.push(CsvRow::new(Arc::clone(&headers), fields));
        }

        debug!(rows = rows.len(), columns = headers.names().len(), "CSV 解析完成");
        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelParser;

impl FileParser for ExcelParser {
    type Row = SheetRow;

    fn name(&self) -> &'static str {
        "excel"
    }

    fn supports(&self, data_type: FileDataType) -> bool {
        data_type.is_spreadsheet()
    }

    fn parse_rows<R: Read>(
        &self,
        data_type: FileDataType,
        mut data: R,
        config: &ImportConfiguration,
    ) -> ImportResult<Vec<SheetRow>> {
        if !self.supports(data_type) {
            return Err(ImportError::UnsupportedSourceKind(data_type));
        }

        // calamine 需要可 Seek 的输入
        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes)?;
        let cursor = Cursor::new(bytes);

        match data_type {
            FileDataType::Xls => {
                let mut workbook = Xls::new(cursor)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                read_workbook::<Cursor<Vec<u8>>, _>(&mut workbook, data_type, config)
            }
            FileDataType::Xlsx => {
                let mut workbook = Xlsx::new(cursor)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                read_workbook::<Cursor<Vec<u8>>, _>(&mut workbook, data_type, config)
            }
            FileDataType::Csv => Err(ImportError::UnsupportedSourceKind(data_type)),
        }
    }
}

/// 按工作表顺序读取所有符合筛选条件的行
fn read_workbook<RS, W>(
    workbook: &mut W,
    kind: FileDataType,
    config: &ImportConfiguration,
) -> ImportResult<Vec<SheetRow>>
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: std::fmt::Display,
{
    let mut rows = Vec::new();

    for sheet_name in workbook.sheet_names() {
        if !config.includes_worksheet(&sheet_name) {
            debug!(sheet = %sheet_name, "工作表不在筛选范围内，跳过");
            continue;
        }

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(format!("{}: {}", sheet_name, e)))?;

        let before = rows.len();
        read_sheet(&range, kind, &sheet_name, config.first_row_has_headers, &mut rows);
        debug!(sheet = %sheet_name, rows = rows.len() - before, "工作表解析完成");
    }

    Ok(rows)
}

fn read_sheet(
    range: &Range<Data>,
    kind: FileDataType,
    sheet_name: &str,
    first_row_has_headers: bool,
    out: &mut Vec<SheetRow>,
) {
    // 已用区域可能不从 A 列开始；列序号按工作表绝对位置计算
    let column_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut grid = range.rows().map(|cells| {
        let mut values = vec![RawValue::Empty; column_offset];
        values.extend(cells.iter().map(convert_cell));
        values
    });

    let headers = if first_row_has_headers {
        match grid.next() {
            Some(header_row) => Arc::new(HeaderIndex::new(header_names(&header_row))),
            None => return,
        }
    } else {
        Arc::new(HeaderIndex::default())
    };

    for cells in grid {
        out.push(SheetRow::new(kind, sheet_name, Arc::clone(&headers), cells));
    }
}

/// 首行提升为表头；空白表头命名为 Column{n}
fn header_names(header_row: &[RawValue]) -> Vec<String> {
    header_row
        .iter()
        .enumerate()
        .map(|(position, cell)| {
            let name = cell.to_text().trim().to_string();
            if name.is_empty() {
                format!("Column{}", position)
            } else {
                name
            }
        })
        .collect()
}

/// calamine 单元格 → 原始值
fn convert_cell(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(f) => RawValue::Float(*f),
        Data::Int(i) => RawValue::Int(*i),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(RawValue::DateTime)
            .unwrap_or_else(|| RawValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(RawValue::DateTime)
            .unwrap_or_else(|| RawValue::Text(s.clone())),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
        // 公式错误单元格按空值处理
        Data::Error(_) => RawValue::Empty,
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
