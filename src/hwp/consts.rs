//! Constants for the HWP 5.x binary format.
//!
//! Tag ids are offsets from `HWPTAG_BEGIN` (0x10). DocInfo and BodyText
//! records share one id space, so a single enum covers both streams.

/// First tag id defined by the format
pub const HWPTAG_BEGIN: u16 = 0x10;

/// Name of the stream holding the file header
pub const FILE_HEADER_STREAM: &str = "FileHeader";

/// Storage holding the per-section body streams
pub const BODY_TEXT_STORAGE: &str = "BodyText";

/// Prefix of per-section stream names (`Section0`, `Section1`, ...)
pub const SECTION_STREAM_PREFIX: &str = "Section";

/// Signature at the start of the FileHeader stream (NUL-padded to 32 bytes)
pub const SIGNATURE: &[u8] = b"HWP Document File";

/// Length of the signature field in the FileHeader stream
pub const SIGNATURE_LEN: usize = 32;

/// Byte offset of the version word in the FileHeader stream
pub const VERSION_OFFSET: usize = 32;

/// Byte offset of the properties word in the FileHeader stream
pub const PROPERTIES_OFFSET: usize = 36;

/// Window bits used for section streams (raw deflate, 32 KiB window)
pub const SECTION_WINDOW_BITS: i8 = -15;

/// Control id of a table control, as read after reversing the first four
/// bytes of a CTRL_HEADER payload
pub const TABLE_CTRL_ID: [u8; 4] = *b"tbl ";

/// Record tag ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum HwpTag {
    // DocInfo
    DocumentProperties = 16,
    IdMappings = 17,
    BinData = 18,
    FaceName = 19,
    BorderFill = 20,
    CharShape = 21,
    TabDef = 22,
    Numbering = 23,
    Bullet = 24,
    ParaShape = 25,
    Style = 26,
    DocData = 27,
    DistributeDocData = 28,
    CompatibleDocument = 30,
    LayoutCompatibility = 31,
    TrackChange = 32,
    MemoShape = 92,
    ForbiddenChar = 94,
    TrackChangeContent = 96,
    TrackChangeAuthor = 97,

    // BodyText
    ParaHeader = 66,
    ParaText = 67,
    ParaCharShape = 68,
    ParaLineSeg = 69,
    ParaRangeTag = 70,
    CtrlHeader = 71,
    ListHeader = 72,
    PageDef = 73,
    FootnoteShape = 74,
    PageBorderFill = 75,
    ShapeComponent = 76,
    Table = 77,
    ShapeComponentLine = 78,
    ShapeComponentRectangle = 79,
    ShapeComponentEllipse = 80,
    ShapeComponentArc = 81,
    ShapeComponentPolygon = 82,
    ShapeComponentCurve = 83,
    ShapeComponentOle = 84,
    ShapeComponentPicture = 85,
    ShapeComponentContainer = 86,
    CtrlData = 87,
    EqEdit = 88,
    ShapeComponentTextArt = 90,
    FormObject = 91,
    MemoList = 93,
    ChartData = 95,
    VideoData = 98,
    ShapeComponentUnknown = 115,

    /// Any id not listed above (reserved or newer than this table)
    Unknown = 0,
}

impl From<u16> for HwpTag {
    fn from(value: u16) -> Self {
        match value {
            16 => HwpTag::DocumentProperties,
            17 => HwpTag::IdMappings,
            18 => HwpTag::BinData,
            19 => HwpTag::FaceName,
            20 => HwpTag::BorderFill,
            21 => HwpTag::CharShape,
            22 => HwpTag::TabDef,
            23 => HwpTag::Numbering,
            24 => HwpTag::Bullet,
            25 => HwpTag::ParaShape,
            26 => HwpTag::Style,
            27 => HwpTag::DocData,
            28 => HwpTag::DistributeDocData,
            30 => HwpTag::CompatibleDocument,
            31 => HwpTag::LayoutCompatibility,
            32 => HwpTag::TrackChange,
            66 => HwpTag::ParaHeader,
            67 => HwpTag::ParaText,
            68 => HwpTag::ParaCharShape,
            69 => HwpTag::ParaLineSeg,
            70 => HwpTag::ParaRangeTag,
            71 => HwpTag::CtrlHeader,
            72 => HwpTag::ListHeader,
            73 => HwpTag::PageDef,
            74 => HwpTag::FootnoteShape,
            75 => HwpTag::PageBorderFill,
            76 => HwpTag::ShapeComponent,
            77 => HwpTag::Table,
            78 => HwpTag::ShapeComponentLine,
            79 => HwpTag::ShapeComponentRectangle,
            80 => HwpTag::ShapeComponentEllipse,
            81 => HwpTag::ShapeComponentArc,
            82 => HwpTag::ShapeComponentPolygon,
            83 => HwpTag::ShapeComponentCurve,
            84 => HwpTag::ShapeComponentOle,
            85 => HwpTag::ShapeComponentPicture,
            86 => HwpTag::ShapeComponentContainer,
            87 => HwpTag::CtrlData,
            88 => HwpTag::EqEdit,
            90 => HwpTag::ShapeComponentTextArt,
            91 => HwpTag::FormObject,
            92 => HwpTag::MemoShape,
            93 => HwpTag::MemoList,
            94 => HwpTag::ForbiddenChar,
            95 => HwpTag::ChartData,
            96 => HwpTag::TrackChangeContent,
            97 => HwpTag::TrackChangeAuthor,
            98 => HwpTag::VideoData,
            115 => HwpTag::ShapeComponentUnknown,
            _ => HwpTag::Unknown,
        }
    }
}

impl HwpTag {
    /// The `HWPTAG_*` name used by the format documentation.
    pub fn name(self) -> &'static str {
        match self {
            HwpTag::DocumentProperties => "HWPTAG_DOCUMENT_PROPERTIES",
            HwpTag::IdMappings => "HWPTAG_ID_MAPPINGS",
            HwpTag::BinData => "HWPTAG_BIN_DATA",
            HwpTag::FaceName => "HWPTAG_FACE_NAME",
            HwpTag::BorderFill => "HWPTAG_BORDER_FILL",
            HwpTag::CharShape => "HWPTAG_CHAR_SHAPE",
            HwpTag::TabDef => "HWPTAG_TAB_DEF",
            HwpTag::Numbering => "HWPTAG_NUMBERING",
            HwpTag::Bullet => "HWPTAG_BULLET",
            HwpTag::ParaShape => "HWPTAG_PARA_SHAPE",
            HwpTag::Style => "HWPTAG_STYLE",
            HwpTag::DocData => "HWPTAG_DOC_DATA",
            HwpTag::DistributeDocData => "HWPTAG_DISTRIBUTE_DOC_DATA",
            HwpTag::CompatibleDocument => "HWPTAG_COMPATIBLE_DOCUMENT",
            HwpTag::LayoutCompatibility => "HWPTAG_LAYOUT_COMPATIBILITY",
            HwpTag::TrackChange => "HWPTAG_TRACKCHANGE",
            HwpTag::MemoShape => "HWPTAG_MEMO_SHAPE",
            HwpTag::ForbiddenChar => "HWPTAG_FORBIDDEN_CHAR",
            HwpTag::TrackChangeContent => "HWPTAG_TRACK_CHANGE",
            HwpTag::TrackChangeAuthor => "HWPTAG_TRACK_CHANGE_AUTHOR",
            HwpTag::ParaHeader => "HWPTAG_PARA_HEADER",
            HwpTag::ParaText => "HWPTAG_PARA_TEXT",
            HwpTag::ParaCharShape => "HWPTAG_PARA_CHAR_SHAPE",
            HwpTag::ParaLineSeg => "HWPTAG_PARA_LINE_SEG",
            HwpTag::ParaRangeTag => "HWPTAG_PARA_RANGE_TAG",
            HwpTag::CtrlHeader => "HWPTAG_CTRL_HEADER",
            HwpTag::ListHeader => "HWPTAG_LIST_HEADER",
            HwpTag::PageDef => "HWPTAG_PAGE_DEF",
            HwpTag::FootnoteShape => "HWPTAG_FOOTNOTE_SHAPE",
            HwpTag::PageBorderFill => "HWPTAG_PAGE_BORDER_FILL",
            HwpTag::ShapeComponent => "HWPTAG_SHAPE_COMPONENT",
            HwpTag::Table => "HWPTAG_TABLE",
            HwpTag::ShapeComponentLine => "HWPTAG_SHAPE_COMPONENT_LINE",
            HwpTag::ShapeComponentRectangle => "HWPTAG_SHAPE_COMPONENT_RECTANGLE",
            HwpTag::ShapeComponentEllipse => "HWPTAG_SHAPE_COMPONENT_ELLIPSE",
            HwpTag::ShapeComponentArc => "HWPTAG_SHAPE_COMPONENT_ARC",
            HwpTag::ShapeComponentPolygon => "HWPTAG_SHAPE_COMPONENT_POLYGON",
            HwpTag::ShapeComponentCurve => "HWPTAG_SHAPE_COMPONENT_CURVE",
            HwpTag::ShapeComponentOle => "HWPTAG_SHAPE_COMPONENT_OLE",
            HwpTag::ShapeComponentPicture => "HWPTAG_SHAPE_COMPONENT_PICTURE",
            HwpTag::ShapeComponentContainer => "HWPTAG_SHAPE_COMPONENT_CONTAINER",
            HwpTag::CtrlData => "HWPTAG_CTRL_DATA",
            HwpTag::EqEdit => "HWPTAG_EQEDIT",
            HwpTag::ShapeComponentTextArt => "HWPTAG_SHAPE_COMPONENT_TEXTART",
            HwpTag::FormObject => "HWPTAG_FORM_OBJECT",
            HwpTag::MemoList => "HWPTAG_MEMO_LIST",
            HwpTag::ChartData => "HWPTAG_CHART_DATA",
            HwpTag::VideoData => "HWPTAG_VIDEO_DATA",
            HwpTag::ShapeComponentUnknown => "HWPTAG_SHAPE_COMPONENT_UNKNOWN",
            HwpTag::Unknown => "HWPTAG_UNKNOWN",
        }
    }

    /// Numeric id of a named tag; `None` for [`HwpTag::Unknown`].
    pub fn id(self) -> Option<u16> {
        match self {
            HwpTag::Unknown => None,
            tag => Some(tag as u16),
        }
    }
}

/// How many UTF-16 code units an in-band control character occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCharKind {
    /// Single code unit (line break, paragraph break, special blanks)
    Char,
    /// Eight code units, no object pointer (tab, field end, title mark)
    Inline,
    /// Eight code units pointing at a control object (table, field start)
    Extended,
}

impl ControlCharKind {
    /// Width of the control character in UTF-16 code units.
    #[inline]
    pub fn code_units(self) -> usize {
        match self {
            ControlCharKind::Char => 1,
            ControlCharKind::Inline | ControlCharKind::Extended => 8,
        }
    }

    /// Category of control code `code`, or `None` outside 0x00..=0x1F.
    pub fn of(code: u8) -> Option<Self> {
        match code {
            0x00 | 0x0A | 0x0D | 0x18..=0x1F => Some(ControlCharKind::Char),
            0x04..=0x09 | 0x13 | 0x14 => Some(ControlCharKind::Inline),
            0x01..=0x03 | 0x0B | 0x0C | 0x0E..=0x12 | 0x15..=0x17 => {
                Some(ControlCharKind::Extended)
            },
            _ => None,
        }
    }
}

/// Line break control code
pub const CTRL_LINE_BREAK: u8 = 0x0A;

/// Name of the `index`-th body section stream.
pub fn section_stream_name(index: usize) -> String {
    format!("{SECTION_STREAM_PREFIX}{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_tags() {
        assert_eq!(HwpTag::from(66), HwpTag::ParaHeader);
        assert_eq!(HwpTag::from(67), HwpTag::ParaText);
        assert_eq!(HwpTag::from(71), HwpTag::CtrlHeader);
        assert_eq!(HwpTag::from(72), HwpTag::ListHeader);
        assert_eq!(HwpTag::from(77), HwpTag::Table);
        assert_eq!(HwpTag::from(77).name(), "HWPTAG_TABLE");
        assert_eq!(HwpTag::Table.id(), Some(77));
    }

    #[test]
    fn test_unknown_tags() {
        assert_eq!(HwpTag::from(0), HwpTag::Unknown);
        assert_eq!(HwpTag::from(0x3FF), HwpTag::Unknown);
        assert_eq!(HwpTag::from(HWPTAG_BEGIN + 13), HwpTag::Unknown);
        assert_eq!(HwpTag::Unknown.id(), None);
    }

    #[test]
    fn test_control_table_covers_full_range() {
        for code in 0x00..=0x1F {
            assert!(ControlCharKind::of(code).is_some(), "missing {code:#04x}");
        }
        assert_eq!(ControlCharKind::of(0x20), None);
        assert_eq!(ControlCharKind::of(CTRL_LINE_BREAK), Some(ControlCharKind::Char));
        assert_eq!(ControlCharKind::of(0x09), Some(ControlCharKind::Inline));
        assert_eq!(ControlCharKind::of(0x0B), Some(ControlCharKind::Extended));
        assert_eq!(ControlCharKind::Extended.code_units(), 8);
    }

    #[test]
    fn test_section_stream_name() {
        assert_eq!(section_stream_name(0), "Section0");
        assert_eq!(section_stream_name(12), "Section12");
    }
}
