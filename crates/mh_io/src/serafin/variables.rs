// crates/mh_io/src/serafin/variables.rs

//! 变量目录
//!
//! Serafin 文件只记录 16 字符的变量名和单位。后处理通过短标识
//! （`U`、`V`、`H`、`QSX` 等）引用变量，标识由法文或英文名称表解析；
//! 不在表中的变量以去空白后的名称作为标识。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 变量名/单位字段宽度
pub const NAME_LEN: usize = 16;

/// 变量名称语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 法文（Telemac 默认）
    #[default]
    Fr,
    /// 英文
    En,
}

impl Language {
    /// 语言代码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 语言解析错误
#[derive(Debug, Clone)]
pub struct LanguageParseError(String);

impl std::fmt::Display for LanguageParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "无效的语言: '{}', 期望 'fr' 或 'en'", self.0)
    }
}

impl std::error::Error for LanguageParseError {}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fr" | "french" | "francais" => Ok(Self::Fr),
            "en" | "english" => Ok(Self::En),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

/// (标识, 法文名, 英文名)
const VARIABLE_TABLE: &[(&str, &str, &str)] = &[
    ("U", "VITESSE U", "VELOCITY U"),
    ("V", "VITESSE V", "VELOCITY V"),
    ("H", "HAUTEUR D'EAU", "WATER DEPTH"),
    ("S", "SURFACE LIBRE", "FREE SURFACE"),
    ("B", "FOND", "BOTTOM"),
    ("Q", "DEBIT SCALAIRE", "SCALAR FLOWRATE"),
    ("I", "DEBIT SUIVANT X", "FLOWRATE ALONG X"),
    ("J", "DEBIT SUIVANT Y", "FLOWRATE ALONG Y"),
    ("M", "VITESSE SCALAIRE", "SCALAR VELOCITY"),
    ("F", "NOMBRE DE FROUDE", "FROUDE NUMBER"),
    ("C", "CELERITE", "CELERITY"),
    ("K", "ENERGIE TURBUL.", "TURBULENT ENERG."),
    ("E", "DISSIPATION", "DISSIPATION"),
    ("D", "VISCOSITE TURB.", "VISCOSITY"),
    ("X", "VENT X", "WIND ALONG X"),
    ("Y", "VENT Y", "WIND ALONG Y"),
    ("P", "PRESSION ATMOS.", "AIR PRESSURE"),
    ("W", "FROTTEMENT", "BOTTOM FRICTION"),
    ("US", "VITESSE DE FROT.", "FRICTION VEL."),
    ("QSX", "DEBIT SOLIDE X", "SOLID DISCH X"),
    ("QSY", "DEBIT SOLIDE Y", "SOLID DISCH Y"),
    ("QS", "DEBIT SOLIDE", "SOLID DISCH"),
    ("QSBLX", "QS CHARRIAGE X", "QS BEDLOAD X"),
    ("QSBLY", "QS CHARRIAGE Y", "QS BEDLOAD Y"),
    ("QSBL", "QS CHARRIAGE", "QS BEDLOAD"),
    ("QSSUSPX", "QS SUSP. X", "QS SUSP. X"),
    ("QSSUSPY", "QS SUSP. Y", "QS SUSP. Y"),
    ("QSSUSP", "QS SUSP.", "QS SUSP."),
];

/// 由 16 字符名称解析变量标识
pub fn variable_id(name: &str, language: Language) -> String {
    let trimmed = name.trim();
    VARIABLE_TABLE
        .iter()
        .find(|(_, fr, en)| match language {
            Language::Fr => *fr == trimmed,
            Language::En => *en == trimmed,
        })
        .map(|(id, _, _)| (*id).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// 由标识查找标准名称
pub fn standard_name(id: &str, language: Language) -> Option<&'static str> {
    VARIABLE_TABLE
        .iter()
        .find(|(key, _, _)| *key == id)
        .map(|(_, fr, en)| match language {
            Language::Fr => *fr,
            Language::En => *en,
        })
}

/// 变量目录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    /// 短标识
    pub id: String,
    /// 名称（不含尾部空白）
    pub name: String,
    /// 单位（不含尾部空白）
    pub unit: String,
}

impl VariableInfo {
    /// 从文件中的名称和单位构造，按语言解析标识
    pub fn from_record(name: &str, unit: &str, language: Language) -> Self {
        Self {
            id: variable_id(name, language),
            name: name.trim_end().to_string(),
            unit: unit.trim_end().to_string(),
        }
    }

    /// 按标准名称构造（未知标识时以标识作为名称）
    pub fn standard(id: &str, unit: &str, language: Language) -> Self {
        Self {
            id: id.to_string(),
            name: standard_name(id, language).unwrap_or(id).to_string(),
            unit: unit.to_string(),
        }
    }

    /// 32 字节记录负载（名称 + 单位，各自补齐到 16 字节）
    pub(crate) fn to_record(&self) -> Vec<u8> {
        let mut out = encode_latin1(&self.name, NAME_LEN);
        out.extend(encode_latin1(&self.unit, NAME_LEN));
        out
    }
}

/// Latin-1 解码（字节与字符一一对应）
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Latin-1 编码到固定宽度，超长截断、不足补空格，非 Latin-1 字符写为 `?`
pub(crate) fn encode_latin1(text: &str, width: usize) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .take(width)
        .collect();
    out.resize(width, b' ');
    out
}
