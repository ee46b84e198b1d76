// ==========================================
// 表格数据导入核心 - 导入管道
// ==========================================
// 流程: 打开数据源 → 逐行 (映射 → 补默认值 → 校验) → 完成
// 红线: 任一行失败即终止整个导入，不返回部分结果
// ==========================================

use crate::config::{ImportConfig, ReferenceLocale};
use crate::domain::types::FileDataType;
use crate::importer::coercion::RowReader;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, ExcelParser, FileParser};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{error, info, instrument, warn, Span};
use uuid::Uuid;

// ==========================================
// RowMapper Trait
// ==========================================
// 用途: 调用方提供的行 → 模型映射
// 实现者: 每个具体模型的映射器
pub trait RowMapper {
    type Model;
    type Config: ImportConfig;

    /// 将一行映射为模型（在此调用 RowReader::set_* 逐字段填充）
    fn map_row(&self, config: &Self::Config, row: &RowReader<'_>) -> ImportResult<Self::Model>;

    /// 映射后补默认值（默认不处理）
    fn set_defaults(&self, model: Self::Model) -> Self::Model {
        model
    }

    /// 补默认值后校验；返回错误将终止整个导入
    fn validate(&self, model: Self::Model) -> ImportResult<Self::Model> {
        Ok(model)
    }
}

// ==========================================
// Importer Trait
// ==========================================
// 用途: 导入主接口
// 实现者: TabularImporter (CsvImporter / ExcelImporter), UniversalImporter
pub trait Importer {
    type Model;
    type Config: ImportConfig;

    /// 从字节流导入
    ///
    /// # 参数
    /// - config: 工作表筛选 + 表头标志 + 各字段列定位
    /// - data_type: 调用方声明的数据格式
    /// - data: 字节流（导入结束前读取完毕并释放）
    ///
    /// # 返回
    /// - Ok(Vec<Model>): 按源顺序排列的模型
    /// - Err: 首个失败（格式不符 / 解析失败 / 字段转换失败 / 校验失败）
    fn get_values<R: Read>(
        &self,
        config: &Self::Config,
        data_type: FileDataType,
        data: R,
    ) -> ImportResult<Vec<Self::Model>>;

    /// 从文件导入（按扩展名推断格式）
    fn import_file<P: AsRef<Path>>(
        &self,
        config: &Self::Config,
        path: P,
    ) -> ImportResult<Vec<Self::Model>> {
        let path = path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let data_type = FileDataType::from_extension(path).ok_or_else(|| {
            ImportError::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )
        })?;

        let file = File::open(path)?;
        self.get_values(config, data_type, BufReader::new(file))
    }
}

// ==========================================
// TabularImporter - 单一解析器的导入器
// ==========================================
pub struct TabularImporter<P, Mp> {
    parser: P,
    mapper: Mp,
    locale: ReferenceLocale,
}

/// 分隔文本导入器（只接受 Csv）
pub type CsvImporter<Mp> = TabularImporter<CsvParser, Mp>;

/// 电子表格导入器（只接受 Xls / Xlsx）
pub type ExcelImporter<Mp> = TabularImporter<ExcelParser, Mp>;

impl<Mp> TabularImporter<CsvParser, Mp> {
    pub fn csv(mapper: Mp) -> Self {
        Self::new(CsvParser, mapper)
    }
}

impl<Mp> TabularImporter<ExcelParser, Mp> {
    pub fn excel(mapper: Mp) -> Self {
        Self::new(ExcelParser, mapper)
    }
}

impl<P, Mp> TabularImporter<P, Mp> {
    pub fn new(parser: P, mapper: Mp) -> Self {
        Self {
            parser,
            mapper,
            locale: ReferenceLocale::default(),
        }
    }

    /// 替换参考区域设置
    pub fn with_locale(mut self, locale: ReferenceLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn mapper(&self) -> &Mp {
        &self.mapper
    }

    pub fn locale(&self) -> &ReferenceLocale {
        &self.locale
    }
}

impl<P, Mp> Importer for TabularImporter<P, Mp>
where
    P: FileParser,
    Mp: RowMapper,
{
    type Model = Mp::Model;
    type Config = Mp::Config;

    fn get_values<R: Read>(
        &self,
        config: &Mp::Config,
        data_type: FileDataType,
        data: R,
    ) -> ImportResult<Vec<Mp::Model>> {
        run_import(&self.parser, &self.mapper, &self.locale, config, data_type, data)
    }
}

// ==========================================
// UniversalImporter - 按格式自动选择解析器
// ==========================================
pub struct UniversalImporter<Mp> {
    mapper: Mp,
    locale: ReferenceLocale,
}

impl<Mp> UniversalImporter<Mp> {
    pub fn new(mapper: Mp) -> Self {
        Self {
            mapper,
            locale: ReferenceLocale::default(),
        }
    }

    pub fn with_locale(mut self, locale: ReferenceLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn mapper(&self) -> &Mp {
        &self.mapper
    }
}

impl<Mp: RowMapper> Importer for UniversalImporter<Mp> {
    type Model = Mp::Model;
    type Config = Mp::Config;

    fn get_values<R: Read>(
        &self,
        config: &Mp::Config,
        data_type: FileDataType,
        data: R,
    ) -> ImportResult<Vec<Mp::Model>> {
        match data_type {
            FileDataType::Csv => run_import(&CsvParser, &self.mapper, &self.locale, config, data_type, data),
            FileDataType::Xls | FileDataType::Xlsx => {
                run_import(&ExcelParser, &self.mapper, &self.locale, config, data_type, data)
            }
        }
    }
}

// ==========================================
// 导入主流程
// ==========================================
#[instrument(skip_all, fields(import_id, parser = parser.name(), data_type = %data_type))]
fn run_import<P, Mp, R>(
    parser: &P,
    mapper: &Mp,
    locale: &ReferenceLocale,
    config: &Mp::Config,
    data_type: FileDataType,
    data: R,
) -> ImportResult<Vec<Mp::Model>>
where
    P: FileParser,
    Mp: RowMapper,
    R: Read,
{
    let import_id = Uuid::new_v4().to_string();
    Span::current().record("import_id", import_id.as_str());

    let settings = config.import_configuration();
    info!(
        import_id = %import_id,
        worksheets = ?settings.worksheet_names,
        first_row_has_headers = settings.first_row_has_headers,
        locale = %locale.name,
        "开始导入"
    );

    // === 步骤 1: 打开数据源 ===
    if !parser.supports(data_type) {
        error!(data_type = %data_type, "数据格式与导入器不匹配");
        return Err(ImportError::UnsupportedSourceKind(data_type));
    }

    let rows = parser
        .parse_rows(data_type, data, settings)
        .map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
    info!(total_rows = rows.len(), "文件解析完成");

    // === 步骤 2: 逐行映射 → 补默认值 → 校验 ===
    let mut models = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let reader = RowReader::new(row, settings.first_row_has_headers, locale);
        let outcome = mapper
            .map_row(config, &reader)
            .map(|model| mapper.set_defaults(model))
            .and_then(|model| mapper.validate(model));

        match outcome {
            Ok(model) => models.push(model),
            Err(e) => {
                warn!(row_number = idx + 1, error = %e, "行处理失败，导入终止");
                return Err(e);
            }
        }
    }

    info!(import_id = %import_id, count = models.len(), "导入完成");
    Ok(models)
}
