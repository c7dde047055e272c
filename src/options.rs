/// Unit in which callers express positions and sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Unit {
    Point,
    #[default]
    Millimeter,
    Centimeter,
    Inch,
}

impl Unit {
    /// Points per unit.
    pub fn scale(&self) -> f64 {
        match self {
            Unit::Point => 1.0,
            Unit::Millimeter => 72.0 / 25.4,
            Unit::Centimeter => 72.0 / 2.54,
            Unit::Inch => 72.0,
        }
    }
}

/// Page dimensions, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    pub fn dimensions(&self) -> (f64, f64) {
        match *self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

/// Options for writing PDF documents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    /// Version written in the file header
    pub version: String,

    /// Unit of the coordinates passed to the document
    pub unit: Unit,

    /// Size of every page
    pub page_size: PageSize,

    /// Deflate level (0-9) for embedded files and page content
    pub compression_level: u32,

    /// Deflate page content streams
    pub compress_pages: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            version: "1.7".to_string(),
            unit: Unit::default(),
            page_size: PageSize::default(),
            compression_level: 6,
            compress_pages: true,
        }
    }
}

impl DocumentOptions {
    /// Create a builder for DocumentOptions
    pub fn builder() -> DocumentOptionsBuilder {
        DocumentOptionsBuilder::default()
    }
}

/// Builder for DocumentOptions
#[derive(Default)]
pub struct DocumentOptionsBuilder {
    options: DocumentOptions,
}

impl DocumentOptionsBuilder {
    /// Set the header version, e.g. "1.7"
    pub fn version<S: Into<String>>(mut self, value: S) -> Self {
        self.options.version = value.into();
        self
    }

    /// Set the user unit
    pub fn unit(mut self, value: Unit) -> Self {
        self.options.unit = value;
        self
    }

    /// Set the page size
    pub fn page_size(mut self, value: PageSize) -> Self {
        self.options.page_size = value;
        self
    }

    /// Set compression level (0-9)
    pub fn compression_level(mut self, value: u32) -> Self {
        self.options.compression_level = value.min(9);
        self
    }

    /// Enable or disable compression of page content
    pub fn compress_pages(mut self, value: bool) -> Self {
        self.options.compress_pages = value;
        self
    }

    /// Build the DocumentOptions
    pub fn build(self) -> DocumentOptions {
        self.options
    }
}

#[test]
fn builder_overrides_defaults() {
    let options = DocumentOptions::builder()
        .unit(Unit::Point)
        .page_size(PageSize::Letter)
        .compression_level(12)
        .compress_pages(false)
        .build();
    assert_eq!(options.version, "1.7");
    assert_eq!(options.unit, Unit::Point);
    assert_eq!(options.page_size.dimensions(), (612.0, 792.0));
    assert_eq!(options.compression_level, 9);
    assert!(!options.compress_pages);
}

#[test]
fn millimeters_scale_to_points() {
    assert!((Unit::Millimeter.scale() * 25.4 - 72.0).abs() < 1e-9);
    assert_eq!(Unit::Inch.scale(), 72.0);
}
