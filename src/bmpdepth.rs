//===========================================================================//

/// Colour depths a headerless DIB payload may use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            16 => Some(BmpDepth::Sixteen),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::Sixteen => 16,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Number of palette entries following the info header.  A nonzero
    /// `colors_used` field overrides the default for paletted depths.
    pub(crate) fn palette_len(&self, colors_used: u32) -> usize {
        let full = match *self {
            BmpDepth::One => 2,
            BmpDepth::Four => 16,
            BmpDepth::Eight => 256,
            _ => return 0,
        };
        if colors_used == 0 || colors_used as usize > full {
            full
        } else {
            colors_used as usize
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::BmpDepth;

    #[test]
    fn bmp_depth_round_trip() {
        let depths = &[
            BmpDepth::One,
            BmpDepth::Four,
            BmpDepth::Eight,
            BmpDepth::Sixteen,
            BmpDepth::TwentyFour,
            BmpDepth::ThirtyTwo,
        ];
        for &depth in depths.iter() {
            assert_eq!(
                BmpDepth::from_bits_per_pixel(depth.bits_per_pixel()),
                Some(depth)
            );
        }
    }

    #[test]
    fn palette_len_honors_colors_used() {
        assert_eq!(BmpDepth::Four.palette_len(0), 16);
        assert_eq!(BmpDepth::Four.palette_len(10), 10);
        assert_eq!(BmpDepth::Eight.palette_len(1000), 256);
        assert_eq!(BmpDepth::TwentyFour.palette_len(5), 0);
        assert_eq!(BmpDepth::ThirtyTwo.palette_len(0), 0);
    }
}

//===========================================================================//
