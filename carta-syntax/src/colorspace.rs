//! Resolving color spaces by name.
//!
//! Content streams refer to color spaces by name. The device color spaces have fixed
//! names, all others are looked up in the resources of the page or form. Only the number
//! of components is of interest here, which is what the length of unfiltered inline image
//! data depends on.

use crate::object::Name;
use phf::phf_map;
use rustc_hash::FxHashMap;

/// The family of a color space, with its number of components where it varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// `DeviceGray`.
    DeviceGray,
    /// `DeviceRGB`.
    DeviceRgb,
    /// `DeviceCMYK`.
    DeviceCmyk,
    /// `CalGray`.
    CalGray,
    /// `CalRGB`.
    CalRgb,
    /// `Lab`.
    Lab,
    /// `ICCBased` with the given number of components.
    IccBased(u8),
    /// `Indexed`.
    Indexed,
    /// `Separation`.
    Separation,
    /// `DeviceN` with the given number of colorants.
    DeviceN(u8),
    /// `Pattern`.
    Pattern,
}

impl ColorSpace {
    /// The number of color components of a single sample.
    ///
    /// Returns `None` for pattern color spaces, whose colors are not made of samples.
    pub fn components(self) -> Option<u8> {
        match self {
            Self::DeviceGray | Self::CalGray | Self::Indexed | Self::Separation => Some(1),
            Self::DeviceRgb | Self::CalRgb | Self::Lab => Some(3),
            Self::DeviceCmyk => Some(4),
            Self::IccBased(n) | Self::DeviceN(n) => Some(n),
            Self::Pattern => None,
        }
    }

    /// Look up a color space that can be used without a resource entry, including the
    /// abbreviations allowed in inline images.
    pub fn device(name: &Name) -> Option<Self> {
        let name = core::str::from_utf8(name.as_bytes()).ok()?;

        DEVICE_COLOR_SPACES.get(name).copied()
    }
}

static DEVICE_COLOR_SPACES: phf::Map<&'static str, ColorSpace> = phf_map! {
    "DeviceGray" => ColorSpace::DeviceGray,
    "G" => ColorSpace::DeviceGray,
    "DeviceRGB" => ColorSpace::DeviceRgb,
    "RGB" => ColorSpace::DeviceRgb,
    "DeviceCMYK" => ColorSpace::DeviceCmyk,
    "CMYK" => ColorSpace::DeviceCmyk,
    "Indexed" => ColorSpace::Indexed,
    "I" => ColorSpace::Indexed,
    "Pattern" => ColorSpace::Pattern,
};

/// Resolves named color spaces.
pub trait ColorSpaceResolver {
    /// Resolve the color space with the given name, or return `None` if it is not defined.
    fn resolve(&self, name: &Name) -> Option<ColorSpace>;
}

/// The color spaces defined in a resource dictionary.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    color_spaces: FxHashMap<Name, ColorSpace>,
}

impl Resources {
    /// Create empty resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a color space.
    pub fn insert_color_space(&mut self, name: impl Into<Name>, color_space: ColorSpace) {
        self.color_spaces.insert(name.into(), color_space);
    }
}

impl ColorSpaceResolver for Resources {
    fn resolve(&self, name: &Name) -> Option<ColorSpace> {
        self.color_spaces
            .get(name)
            .copied()
            .or_else(|| ColorSpace::device(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_names() {
        assert_eq!(
            ColorSpace::device(&Name::from("RGB")),
            Some(ColorSpace::DeviceRgb)
        );
        assert_eq!(
            ColorSpace::device(&Name::from("DeviceCMYK")).and_then(ColorSpace::components),
            Some(4)
        );
        assert_eq!(ColorSpace::device(&Name::from("CS0")), None);
    }

    #[test]
    fn resources() {
        let mut resources = Resources::new();
        resources.insert_color_space("CS0", ColorSpace::IccBased(3));

        assert_eq!(
            resources.resolve(&Name::from("CS0")),
            Some(ColorSpace::IccBased(3))
        );
        assert_eq!(
            resources.resolve(&Name::from("G")),
            Some(ColorSpace::DeviceGray)
        );
        assert_eq!(resources.resolve(&Name::from("CS1")), None);
    }
}
