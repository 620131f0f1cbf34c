use thiserror::Error;

/// Everything that can go wrong decoding a GIF stream.
///
/// Any variant short-circuits the decode: the caller gets `Err` and
/// whatever scratch canvases had been built so far are simply dropped.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("not a GIF file: missing \"GIF87a\"/\"GIF89a\" signature")]
    BadMagic,

    #[error("unsupported GIF version {0:?}")]
    BadVersion([u8; 3]),

    #[error("image dimensions {width}x{height} exceed the {limit} sanity limit")]
    TooLarge { width: u32, height: u32, limit: u32 },

    #[error(
        "image descriptor rectangle ({left},{top},{width},{height}) does not fit the \
         {screen_width}x{screen_height} screen"
    )]
    BadImageRect {
        left: u16,
        top: u16,
        width: u16,
        height: u16,
        screen_width: u16,
        screen_height: u16,
    },

    #[error("image block has no color table (no local table, and no global table was present)")]
    NoPalette,

    #[error("LZW stream emitted a code before any clear code was seen")]
    NoClearCode,

    #[error("LZW stream referenced an undefined code")]
    BadCode,

    #[error("LZW code table grew past its 8192-entry sentinel")]
    TooManyCodes,

    #[error("unrecognized block introducer byte {0:#04x}")]
    UnknownBlock(u8),

    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("byte source does not support un-reading bytes")]
    UnsupportedSeek,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
