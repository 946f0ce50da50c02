//! Tag → (name, decoder) table.
//!
//! The one-byte tag at the head of every decoded frame is the
//! interoperability contract with embedded senders; the table below fixes
//! the semantic name, element kind, vector arity, and fixed-point rescale
//! for each assigned tag. Unassigned slots decode to nothing.
//!
//! Layout of the tag space:
//! - 0–15 basic kinds, 16–51 physics, 61–112 physiology, 120–141 motion,
//!   150–190 air quality, 200–207 audio, 220–225 images;
//! - 252/253 compressed wrappers, 254 extension, 250/251/255 reserved.

use std::sync::OnceLock;

use byteorder::{ByteOrder, LittleEndian};

use super::TypeDecodeError;
use crate::types::{Mat, Payload, Scalar, Vector};

// ─────────────────────────────────────────────────────────────────────────────
// Element kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Wire element kind of a numeric body (all multi-byte kinds little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    U8,
    I8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ElementKind {
    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::I64 | ElementKind::U64 | ElementKind::F64 => 8,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tag classification
// ─────────────────────────────────────────────────────────────────────────────

/// How the body of a tag decodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TagKind {
    /// No decoder registered; frames are dropped.
    Unassigned,
    /// NUL-separated UTF-8 strings.
    Utf8Text,
    /// Booleans, one byte each.
    Bool,
    /// Raw byte array.
    Bytes,
    /// Scalars / vectors / arity-grouped matrices of one element kind, with
    /// an optional fixed-point rescale `y = x · scale`.
    Numeric {
        kind: ElementKind,
        arity: usize,
        scale: Option<f64>,
    },
    /// PCM audio. `wide` selects 16-bit samples.
    AudioRaw { wide: bool, stereo: bool },
    /// IMA ADPCM audio (decodes to 16-bit PCM either way).
    AudioAdpcm { wide: bool, stereo: bool },
    ImageGray8,
    ImagePalette8,
    ImageRgb8,
    ImageRgba8,
    ImageGray8Dct,
    ImageRgb8Dct,
    /// zlib-compressed wrapper around further COBS frames.
    ZlibWrapper,
    /// tamp-compressed wrapper around further COBS frames.
    TampWrapper,
    /// Secondary-tag extension.
    Extension,
    Reserved,
}

/// One slot of the tag table.
#[derive(Debug, Clone, Copy)]
pub struct TagEntry {
    pub name: &'static str,
    pub kind: TagKind,
}

// ─────────────────────────────────────────────────────────────────────────────
// TypeRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only tag table, shareable across decoder instances.
pub struct TypeRegistry {
    entries: Vec<TagEntry>,
}

impl TypeRegistry {
    /// The process-wide standard table.
    pub fn standard() -> &'static TypeRegistry {
        static TABLE: OnceLock<TypeRegistry> = OnceLock::new();
        TABLE.get_or_init(TypeRegistry::build)
    }

    pub fn entry(&self, tag: u8) -> &TagEntry {
        &self.entries[tag as usize]
    }

    pub fn name(&self, tag: u8) -> &'static str {
        self.entries[tag as usize].name
    }

    fn build() -> TypeRegistry {
        use ElementKind::*;

        let mut t = vec![
            TagEntry {
                name: "u/k",
                kind: TagKind::Unassigned,
            };
            256
        ];
        let mut set = |tag: usize, name: &'static str, kind: TagKind| {
            t[tag] = TagEntry { name, kind };
        };
        let num = |kind, arity, scale| TagKind::Numeric { kind, arity, scale };
        let plain = |kind| TagKind::Numeric {
            kind,
            arity: 1,
            scale: None,
        };

        // basic kinds
        set(0, "char", TagKind::Utf8Text);
        set(1, "bool", TagKind::Bool);
        set(2, "byte", TagKind::Bytes);
        set(3, "int8", plain(I8));
        set(4, "int16", plain(I16));
        set(5, "uint16", plain(U16));
        set(6, "int", plain(I32));
        set(7, "uint", plain(U32));
        set(8, "int64", plain(I64));
        set(9, "uint64", plain(U64));
        set(10, "float", plain(F32));
        set(11, "double", plain(F64));

        // physics (SI and derived, float unless noted)
        set(16, "length [m]", plain(F32));
        set(17, "mass [kg]", plain(F32));
        set(18, "time [s]", plain(F32));
        set(19, "current [A]", plain(F32));
        set(20, "temperature [K]", plain(F32));
        set(21, "amount [mol]", plain(F32));
        set(22, "luminous_intensity [cd]", plain(F32));
        set(23, "brightness [lm]", plain(F32));
        set(24, "angle [deg]", plain(F32));
        set(25, "area [m^2]", plain(F32));
        set(26, "volume [m^3]", plain(F32));
        set(27, "force [N]", plain(F32));
        set(28, "velocity [m/s]", plain(F32));
        set(29, "acceleration [m/s^2]", plain(F32));
        set(31, "pressure_P [Pa]", plain(F32));
        set(32, "pressure_mB [mBar]", plain(F32));
        set(33, "energy [J]", plain(F32));
        set(34, "power [W]", plain(F32));
        set(35, "charge [C]", plain(F32));
        set(36, "voltage [V]", plain(F32));
        set(37, "resistance [Ohm]", plain(F32));
        set(38, "conductance [S]", plain(F32));
        set(39, "reactance [Ohm]", plain(F32));
        set(40, "impedance [Ohm]", num(F32, 2, None)); // (R, X) pairs
        set(41, "phase [deg]", plain(F32));
        set(42, "inductance [H]", plain(F32));
        set(43, "capacitance [F]", plain(F32));
        set(44, "magnetic_field [T]", plain(F32));
        set(45, "frequency [Hz]", plain(F32));
        set(46, "molarity [mol/l]", plain(F32));
        set(47, "electron volts [eV]", plain(F32));
        set(50, "optical spectrum", num(F32, 2, None)); // (wavelength, intensity)
        set(51, "frequency spectrum", num(F32, 2, None)); // (frequency, intensity)

        // physiology
        set(61, "Temperature [C]", num(U16, 1, Some(1e-3)));
        set(62, "Heart Rate [bpm]", num(U16, 1, Some(1e-2)));
        set(63, "Heart Rate Variability [ms]", plain(F32));
        set(64, "Respiratory Rate [bpm]", num(U16, 1, Some(1e-2)));
        set(65, "Blood Pressure [mmHg]", num(U16, 1, Some(1e-2)));
        set(66, "Blood Pressure Systolic [mmHg]", num(U16, 1, Some(1e-2)));
        set(67, "Blood Pressure Diastolic [mmHg]", num(U16, 1, Some(1e-2)));
        set(68, "SPO2 [%]", num(U16, 1, Some(1e-2)));
        set(70, "Weight [kg]", num(U32, 1, Some(1e-6)));
        set(71, "Height [m]", num(U16, 1, Some(1e-2)));
        set(72, "Age [yrs]", num(U16, 1, Some(1e-2)));
        set(73, "BMI", num(U16, 1, Some(1e-3)));
        set(74, "Waist Circumference [cm]", num(U16, 1, Some(1e-3)));
        set(75, "Hip Circumference [cm]", num(U16, 1, Some(1e-3)));
        set(76, "Chest Circumference [cm]", num(U16, 1, Some(1e-3)));
        set(77, "Thigh Circumference [cm]", num(U16, 1, Some(1e-3)));
        set(78, "Arm Circumference [cm]", num(U16, 1, Some(1e-3)));
        set(79, "Calf Circumference [cm]", num(U16, 1, Some(1e-3)));
        set(80, "BIOZ [Hz, Ohm, Ohm]", num(F32, 3, None));
        set(81, "Fat Free Mass [kg]", num(F32, 1, Some(1e-2)));
        set(82, "Total Body Water [l]", num(F32, 1, Some(1e-2)));
        set(83, "Extracellular Water [l]", num(F32, 1, Some(1e-2)));
        set(84, "Total Body Potassium [gr]", plain(F32));
        set(85, "Body Fat [%]", plain(F32));
        set(86, "Body Water [%]", plain(F32));
        set(87, "Body Muscle [%]", plain(F32));
        set(90, "ECG [V]", num(I16, 1, Some(1e-6)));
        set(91, "ECG 12 Lead [m]", num(I16, 12, Some(1e-6)));
        set(92, "EEG [V]", num(I16, 1, Some(1e-6)));
        set(93, "EMG [V]", num(I16, 1, Some(1e-6)));
        set(100, "Forced Expiratory Volume [l/s]", num(I16, 1, Some(1e-3)));
        set(101, "Lung Flow [l/s]", num(U16, 1, Some(1e-3)));
        set(102, "Lung Volume [l]", num(U16, 1, Some(1e-3)));
        set(105, "Glucose Level [mg/dl]", plain(F32));
        set(106, "Cholesterol Level [mg/dl]", plain(F32));
        set(107, "Base Metabolic Rate [kcal/day]", plain(F32));
        set(110, "Reaction Time [sec]", num(F32, 1, Some(1e-3)));
        set(111, "Range of Motion [deg]", plain(F32));
        set(112, "Grip Strength [kg]", plain(F32));

        // motion and position
        set(120, "Acceleration 3D [m/s^2]", num(F32, 3, None));
        set(121, "Velocity 3D [m/s]", num(F32, 3, None));
        set(122, "Position 3D [m]", num(F32, 3, None));
        set(123, "Orientation YPR 3D [deg]", num(F32, 3, None));
        set(124, "Orientation YPR 3D [deg]", num(I16, 3, Some(1e-2)));
        set(125, "Magnetometer 3D [microT]", num(F32, 3, None));
        set(126, "Magnetometer 3D [microT]", num(F32, 3, None));
        set(128, "Gyration 3D [deg/sec]", num(F32, 3, None));
        set(129, "Gyration 3D [deg/sec]", num(F32, 3, None));
        set(130, "Position [deg.deg.m]", num(F32, 3, None));
        set(131, "Altitude [m]", plain(F32));
        set(140, "Steps [s/min]", num(I16, 1, Some(1e-2)));
        set(141, "Steps", plain(U32));

        // air quality and gas
        set(150, "PM [microgr/m^3]", num(F32, 3, None)); // PM1.0, PM2.5, PM10
        set(151, "PM 1 [microgr/m^3]", plain(F32));
        set(152, "PM 2.5 [microgr/m^3]", plain(F32));
        set(153, "PM 10 [microgr/m^3]", plain(F32));
        set(155, "CO2 [ppm]", plain(U16));
        set(156, "eCO2", plain(U16));
        set(157, "VOC [ppb]", plain(U16));
        set(158, "eVOC", plain(U16));
        set(159, "NO2 [ppb]", plain(U16));
        set(160, "eNO2", plain(U16));
        set(161, "SO2 [ppb]", plain(U16));
        set(162, "eSO2", plain(U16));
        set(163, "O3 [ppb]", plain(U16));
        set(164, "eO3", plain(U16));
        set(165, "CO [ppm]", plain(U16));
        set(166, "eCO", plain(U16));
        set(167, "H2S [ppb]", plain(U16));
        set(168, "eH2S", plain(U16));
        set(169, "NH3 [ppb]", plain(U16));
        set(170, "eNH3", plain(U16));
        set(171, "H2 [ppm]", plain(U16));
        set(172, "eH2", plain(U16));
        set(173, "CH4 [ppm]", plain(U16));
        set(174, "eCH4", plain(U16));
        set(175, "C2H6 [ppm]", plain(U16));
        set(176, "eC2H6", plain(U16));
        set(190, "IAQ", plain(U16));

        // audio
        set(200, "audio mono 8", TagKind::AudioRaw { wide: false, stereo: false });
        set(201, "audio stereo 8", TagKind::AudioRaw { wide: false, stereo: true });
        set(202, "audio mono 16", TagKind::AudioRaw { wide: true, stereo: false });
        set(203, "audio stereo 16", TagKind::AudioRaw { wide: true, stereo: true });
        set(204, "audio mono 8 ADPCM", TagKind::AudioAdpcm { wide: false, stereo: false });
        set(205, "audio stereo 8 ADPCM", TagKind::AudioAdpcm { wide: false, stereo: true });
        set(206, "audio mono 16 ADPCM", TagKind::AudioAdpcm { wide: true, stereo: false });
        set(207, "audio stereo 16 ADPCM", TagKind::AudioAdpcm { wide: true, stereo: true });

        // images
        set(220, "image gray 8", TagKind::ImageGray8);
        set(221, "image color 8", TagKind::ImagePalette8);
        set(222, "image color 24", TagKind::ImageRgb8);
        set(223, "image color 32", TagKind::ImageRgba8);
        set(224, "image gray 8 dct", TagKind::ImageGray8Dct);
        set(225, "image color 24 dct", TagKind::ImageRgb8Dct);

        // wrappers and reserved
        set(250, "u/k", TagKind::Reserved);
        set(251, "u/k", TagKind::Reserved);
        set(252, "zlib compression", TagKind::ZlibWrapper);
        set(253, "tamp compression", TagKind::TampWrapper);
        set(254, "general extension", TagKind::Extension);
        set(255, "u/k", TagKind::Reserved);

        TypeRegistry { entries: t }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Numeric body decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Decode a numeric body per its registry classification.
///
/// A body of exactly one element yields a scalar, otherwise a vector (or an
/// arity-grouped matrix). Scaled kinds widen to f64. Length must be a
/// non-zero multiple of `element size × arity`.
pub(super) fn decode_numeric(
    tag: u8,
    kind: ElementKind,
    arity: usize,
    scale: Option<f64>,
    body: &[u8],
) -> Result<Payload, TypeDecodeError> {
    let unit = kind.size() * arity;
    if body.is_empty() {
        return Err(TypeDecodeError::Empty { tag });
    }
    if body.len() % unit != 0 {
        return Err(TypeDecodeError::Length {
            tag,
            len: body.len(),
            unit,
        });
    }

    if arity > 1 {
        let values = read_as_f64(kind, body);
        let scale = scale.unwrap_or(1.0);
        let scaled: Vec<f64> = values.into_iter().map(|v| v * scale).collect();
        let rows = scaled.len() / arity;
        return Ok(Payload::Matrix(Mat::from_vec(rows, arity, scaled)));
    }

    match scale {
        Some(s) => {
            let values: Vec<f64> = read_as_f64(kind, body).into_iter().map(|v| v * s).collect();
            if values.len() == 1 {
                Ok(Payload::Scalar(Scalar::F64(values[0])))
            } else {
                Ok(Payload::Vector(Vector::F64(values)))
            }
        }
        None => Ok(decode_native(kind, body)),
    }
}

/// Read every element and widen to f64 (for scaled and grouped payloads).
fn read_as_f64(kind: ElementKind, body: &[u8]) -> Vec<f64> {
    match kind {
        ElementKind::U8 => body.iter().map(|&b| b as f64).collect(),
        ElementKind::I8 => body.iter().map(|&b| b as i8 as f64).collect(),
        ElementKind::I16 => body
            .chunks_exact(2)
            .map(|c| LittleEndian::read_i16(c) as f64)
            .collect(),
        ElementKind::U16 => body
            .chunks_exact(2)
            .map(|c| LittleEndian::read_u16(c) as f64)
            .collect(),
        ElementKind::I32 => body
            .chunks_exact(4)
            .map(|c| LittleEndian::read_i32(c) as f64)
            .collect(),
        ElementKind::U32 => body
            .chunks_exact(4)
            .map(|c| LittleEndian::read_u32(c) as f64)
            .collect(),
        ElementKind::I64 => body
            .chunks_exact(8)
            .map(|c| LittleEndian::read_i64(c) as f64)
            .collect(),
        ElementKind::U64 => body
            .chunks_exact(8)
            .map(|c| LittleEndian::read_u64(c) as f64)
            .collect(),
        ElementKind::F32 => body
            .chunks_exact(4)
            .map(|c| LittleEndian::read_f32(c) as f64)
            .collect(),
        ElementKind::F64 => body.chunks_exact(8).map(LittleEndian::read_f64).collect(),
    }
}

/// Decode to the native element kind, scalar when the body holds exactly one
/// element.
fn decode_native(kind: ElementKind, body: &[u8]) -> Payload {
    let size = kind.size();
    let n = body.len() / size;
    if n == 1 {
        let scalar = match kind {
            ElementKind::U8 => Scalar::U8(body[0]),
            ElementKind::I8 => Scalar::I8(body[0] as i8),
            ElementKind::I16 => Scalar::I16(LittleEndian::read_i16(body)),
            ElementKind::U16 => Scalar::U16(LittleEndian::read_u16(body)),
            ElementKind::I32 => Scalar::I32(LittleEndian::read_i32(body)),
            ElementKind::U32 => Scalar::U32(LittleEndian::read_u32(body)),
            ElementKind::I64 => Scalar::I64(LittleEndian::read_i64(body)),
            ElementKind::U64 => Scalar::U64(LittleEndian::read_u64(body)),
            ElementKind::F32 => Scalar::F32(LittleEndian::read_f32(body)),
            ElementKind::F64 => Scalar::F64(LittleEndian::read_f64(body)),
        };
        return Payload::Scalar(scalar);
    }
    let vector = match kind {
        ElementKind::U8 => Vector::U8(body.to_vec()),
        ElementKind::I8 => Vector::I8(body.iter().map(|&b| b as i8).collect()),
        ElementKind::I16 => {
            let mut v = vec![0i16; n];
            LittleEndian::read_i16_into(body, &mut v);
            Vector::I16(v)
        }
        ElementKind::U16 => {
            let mut v = vec![0u16; n];
            LittleEndian::read_u16_into(body, &mut v);
            Vector::U16(v)
        }
        ElementKind::I32 => {
            let mut v = vec![0i32; n];
            LittleEndian::read_i32_into(body, &mut v);
            Vector::I32(v)
        }
        ElementKind::U32 => {
            let mut v = vec![0u32; n];
            LittleEndian::read_u32_into(body, &mut v);
            Vector::U32(v)
        }
        ElementKind::I64 => {
            let mut v = vec![0i64; n];
            LittleEndian::read_i64_into(body, &mut v);
            Vector::I64(v)
        }
        ElementKind::U64 => {
            let mut v = vec![0u64; n];
            LittleEndian::read_u64_into(body, &mut v);
            Vector::U64(v)
        }
        ElementKind::F32 => {
            let mut v = vec![0f32; n];
            LittleEndian::read_f32_into(body, &mut v);
            Vector::F32(v)
        }
        ElementKind::F64 => {
            let mut v = vec![0f64; n];
            LittleEndian::read_f64_into(body, &mut v);
            Vector::F64(v)
        }
    };
    Payload::Vector(vector)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
