//! Configuration Store Module
//!
//! マッピング設定を（会社, スキーマ）の組で読み込み、キャッシュするモジュール。
//!
//! キャッシュはストアの生存期間中保持され、破棄（eviction）は行いません。
//! 読み込み済みの設定は不変であり、`Arc`で複数の変換処理から共有されます。

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::config::MappingConfiguration;
use crate::api::Schema;
use crate::error::ImpexError;
use crate::security::validate_company_name;

/// バイナリに同梱されたマッピング設定
const BUNDLED_DOCUMENTS: [(&str, Schema, &str); 2] = [
    (
        "Typhoon",
        Schema::Catalog,
        include_str!("../../config/companies/Typhoon/catalog.json"),
    ),
    (
        "ExampleCorp",
        Schema::Catalog,
        include_str!("../../config/companies/ExampleCorp/catalog.json"),
    ),
];

/// 設定の取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `<root>/<会社名>/<スキーマ>.json`形式のディレクトリ
    Directory(PathBuf),

    /// バイナリに同梱された設定
    Bundled,
}

/// キャッシュのキー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// 会社名
    pub company: String,
    /// スキーマ
    pub schema: Schema,
}

/// 会社の概要情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    /// 会社名（設定の参照名）
    pub name: String,
    /// 説明
    pub description: String,
    /// 設定のバージョン
    pub version: String,
}

/// マッピング設定のストア
///
/// # 使用例
///
/// ```rust
/// use sfcc_impex::{ConfigStore, Schema};
///
/// let store = ConfigStore::bundled();
/// let first = store.load("Typhoon", Schema::Catalog).unwrap();
/// let second = store.load("Typhoon", Schema::Catalog).unwrap();
/// // 2回目はキャッシュから同じインスタンスが返る
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    source: ConfigSource,
    cache: RwLock<HashMap<ConfigKey, Arc<MappingConfiguration>>>,
}

impl ConfigStore {
    /// 取得元を指定してストアを生成
    pub fn new(source: ConfigSource) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 同梱設定を使用するストアを生成
    pub fn bundled() -> Self {
        Self::new(ConfigSource::Bundled)
    }

    /// ディレクトリから設定を読み込むストアを生成
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(ConfigSource::Directory(root.into()))
    }

    /// 設定の取得元
    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// マッピング設定を取得する
    ///
    /// 初回はソースから読み込んで検証し、以降はキャッシュを返します。
    ///
    /// # 引数
    ///
    /// * `company` - 会社名
    /// * `schema` - スキーマ
    ///
    /// # 戻り値
    ///
    /// * `Ok(Arc<MappingConfiguration>)` - 設定
    /// * `Err(ImpexError::ConfigNotFound)` - 設定が存在しない場合
    /// * `Err(ImpexError::Json | ImpexError::Config)` - 設定が不正な場合
    pub fn load(&self, company: &str, schema: Schema) -> Result<Arc<MappingConfiguration>, ImpexError> {
        let key = ConfigKey {
            company: company.to_string(),
            schema,
        };

        if let Some(cached) = self.cache.read().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let config = Arc::new(self.read_source(company, schema)?);
        debug!(company, %schema, "Loaded mapping configuration");

        let mut cache = self.cache.write();
        let entry = cache.entry(key).or_insert(config);
        Ok(Arc::clone(entry))
    }

    /// キャッシュ済みの設定数
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    /// 利用可能な会社の一覧（名前順）
    ///
    /// カタログスキーマの設定を持つ会社を列挙します。読み込めない設定は
    /// エラーとして返します。
    pub fn available_companies(&self) -> Result<Vec<CompanyInfo>, ImpexError> {
        let names: Vec<String> = match &self.source {
            ConfigSource::Bundled => BUNDLED_DOCUMENTS
                .iter()
                .filter(|(_, schema, _)| *schema == Schema::Catalog)
                .map(|(name, _, _)| name.to_string())
                .collect(),
            ConfigSource::Directory(root) => list_company_dirs(root, Schema::Catalog)?,
        };

        let mut companies = names
            .into_iter()
            .map(|name| {
                let config = self.load(&name, Schema::Catalog)?;
                Ok(CompanyInfo {
                    name,
                    description: config.description.clone(),
                    version: config.version.clone(),
                })
            })
            .collect::<Result<Vec<_>, ImpexError>>()?;
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    fn read_source(&self, company: &str, schema: Schema) -> Result<MappingConfiguration, ImpexError> {
        let not_found = || ImpexError::ConfigNotFound {
            company: company.to_string(),
            schema: schema.to_string(),
        };

        match &self.source {
            ConfigSource::Bundled => {
                let (_, _, json) = BUNDLED_DOCUMENTS
                    .iter()
                    .find(|(name, s, _)| *name == company && *s == schema)
                    .ok_or_else(not_found)?;
                MappingConfiguration::from_json_str(json)
            }
            ConfigSource::Directory(root) => {
                if validate_company_name(company).is_err() {
                    return Err(not_found());
                }
                let path = document_path(root, company, schema);
                if !path.is_file() {
                    return Err(not_found());
                }
                MappingConfiguration::from_path(&path)
            }
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::bundled()
    }
}

fn document_path(root: &Path, company: &str, schema: Schema) -> PathBuf {
    root.join(company).join(format!("{}.json", schema.file_stem()))
}

fn list_company_dirs(root: &Path, schema: Schema) -> Result<Vec<String>, ImpexError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
            continue;
        };
        if document_path(root, &name, schema).is_file() {
            names.push(name);
        }
    }
    Ok(names)
}
