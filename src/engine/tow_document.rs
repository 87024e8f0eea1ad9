// ==========================================
// 停车违章执法系统 - 拖车授权文书生成
// ==========================================
// 版式固定: 标题 / 车牌 / 授权人 / 日期,无其他计算内容
// 边界: 生成器不检查车牌状态,由调用方先确认最近状态为 TOW
// 输出: 内存中的 PDF,是否落盘由调用方决定
// ==========================================

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::violation::{OfficerContext, TIMESTAMP_FORMAT};

pub const DOCUMENT_TITLE: &str = "TOW AUTHORIZATION";

// US Letter
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 72;
const TITLE_FONT_SIZE: i64 = 20;
const BODY_FONT_SIZE: i64 = 12;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("PDF 编码失败: {0}")]
    Encode(String),

    #[error("字符 {0:?} 无法用 WinAnsi 编码")]
    UnsupportedCharacter(char),

    #[error("文书写入失败: {0}")]
    Io(#[from] std::io::Error),
}

// ==========================================
// TowAuthorization - 拖车授权文书
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct TowAuthorization {
    pub authorization_id: Uuid,
    pub plate: String,
    pub officer: String,
    pub issued_at: NaiveDateTime,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl TowAuthorization {
    /// 建议文件名: tow_<车牌>_<授权ID>.pdf
    ///
    /// 车牌中非字母数字字符替换为 '_',授权ID 保证并发生成不重名。
    pub fn suggested_file_name(&self) -> String {
        let safe_plate: String = self
            .plate
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("tow_{}_{}.pdf", safe_plate, self.authorization_id.simple())
    }

    /// 写入指定目录,返回文件路径
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, DocumentError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.suggested_file_name());
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

// ==========================================
// TowAuthorizationGenerator - 文书生成器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct TowAuthorizationGenerator;

impl TowAuthorizationGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 生成拖车授权 PDF
    ///
    /// 不校验车牌状态。
    pub fn generate(
        &self,
        plate: &str,
        officer: &OfficerContext,
        issued_at: NaiveDateTime,
    ) -> Result<TowAuthorization, DocumentError> {
        let lines = [
            (TITLE_FONT_SIZE, DOCUMENT_TITLE.to_string()),
            (BODY_FONT_SIZE, format!("Plate: {}", plate)),
            (BODY_FONT_SIZE, format!("Authorized by: {}", officer.username)),
            (
                BODY_FONT_SIZE,
                format!("Date: {}", issued_at.format(TIMESTAMP_FORMAT)),
            ),
        ];

        let bytes = render_pdf(&lines)?;

        tracing::info!(plate = %plate, officer = %officer.username, size = bytes.len(), "拖车授权已生成");

        Ok(TowAuthorization {
            authorization_id: Uuid::new_v4(),
            plate: plate.to_string(),
            officer: officer.username.clone(),
            issued_at,
            bytes,
        })
    }
}

/// 单页 PDF,每行 (字号, 文本) 自上而下排列
fn render_pdf(lines: &[(i64, String)]) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let encoded_lines = lines
        .iter()
        .map(|(size, text)| win_ansi_bytes(text).map(|bytes| (*size, bytes)))
        .collect::<Result<Vec<_>, DocumentError>>()?;

    let mut operations = Vec::new();
    let mut y = PAGE_HEIGHT - LEFT_MARGIN;

    for (size, text) in encoded_lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
        operations.push(Operation::new("Td", vec![LEFT_MARGIN.into(), y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(text, StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
        y -= size * 2;
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| DocumentError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| DocumentError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// 文本转为 WinAnsiEncoding 单字节
///
/// 0x20..=0x7E 与 0xA0..=0xFF 同 Latin-1;0x80..=0x9F 仅收录常用标点与欧元符号。
fn win_ansi_bytes(text: &str) -> Result<Vec<u8>, DocumentError> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => Ok(c as u8),
            '€' => Ok(0x80),
            '‘' => Ok(0x91),
            '’' => Ok(0x92),
            '“' => Ok(0x93),
            '”' => Ok(0x94),
            '–' => Ok(0x96),
            '—' => Ok(0x97),
            _ => Err(DocumentError::UnsupportedCharacter(c)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UserRole;
    use chrono::NaiveDate;

    fn issued_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 6)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_document_contains_four_fields() {
        let officer = OfficerContext::new("jdoe", UserRole::Officer);
        let doc = TowAuthorizationGenerator::new()
            .generate("ABC123", &officer, issued_at())
            .unwrap();

        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert!(contains(&doc.bytes, DOCUMENT_TITLE));
        assert!(contains(&doc.bytes, "Plate: ABC123"));
        assert!(contains(&doc.bytes, "Authorized by: jdoe"));
        assert!(contains(&doc.bytes, "Date: 2026-05-06 14:30:00"));

        let parsed = Document::load_mem(&doc.bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn test_file_name_is_sanitized_and_unique() {
        let officer = OfficerContext::new("jdoe", UserRole::Officer);
        let generator = TowAuthorizationGenerator::new();

        let a = generator.generate("AB/12 3", &officer, issued_at()).unwrap();
        let b = generator.generate("AB/12 3", &officer, issued_at()).unwrap();

        let name = a.suggested_file_name();
        assert!(name.starts_with("tow_AB_12_3_"));
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains('/'));
        assert_ne!(name, b.suggested_file_name());
    }

    /// 解析 PDF,取出全部 Tj 文本的原始字节
    fn shown_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
        let parsed = Document::load_mem(bytes).unwrap();
        let page_id = *parsed.get_pages().values().next().unwrap();
        let content = Content::decode(&parsed.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .into_iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.into_iter().next() {
                Some(Object::String(text, _)) => Some(text),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_latin1_text_encoded_as_win_ansi() {
        let officer = OfficerContext::new("Müller", UserRole::Officer);
        let doc = TowAuthorizationGenerator::new()
            .generate("ÄB123", &officer, issued_at())
            .unwrap();

        let shown = shown_strings(&doc.bytes);
        assert_eq!(shown.len(), 4);
        assert_eq!(shown[1], b"Plate: \xC4B123".to_vec());
        assert_eq!(shown[2], b"Authorized by: M\xFCller".to_vec());
        assert!(!contains(&doc.bytes, "Müller"), "不应写入 UTF-8 字节");
        assert!(contains(&doc.bytes, "WinAnsiEncoding"));
    }

    #[test]
    fn test_unencodable_text_rejected() {
        let officer = OfficerContext::new("jdoe", UserRole::Officer);
        let result = TowAuthorizationGenerator::new().generate("京A12345", &officer, issued_at());

        assert!(matches!(
            result,
            Err(DocumentError::UnsupportedCharacter('京'))
        ));
        assert_eq!(win_ansi_bytes("A–B").unwrap(), vec![b'A', 0x96, b'B']);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let officer = OfficerContext::new("jdoe", UserRole::Admin);
        let doc = TowAuthorizationGenerator::new()
            .generate("ABC123", &officer, issued_at())
            .unwrap();

        let path = doc.write_to_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), doc.bytes);
    }
}
