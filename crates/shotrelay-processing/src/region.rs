//! Extraction-rectangle resolution.
//!
//! Screenshot dimensions vary between calls, so a requested rectangle can
//! land partially or fully off-canvas. `resolve` never rejects such input;
//! it clamps. The clamp order is left/top first, then width/height bounded
//! by what remains, so the offset wins when both offset and size are out of
//! range.

/// A rectangle guaranteed to lie fully inside the image it was resolved
/// against: `left + width <= image_width`, `top + height <= image_height`,
/// and both extents are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Raw, unvalidated geometry as it arrived in the request. Values may be
/// negative, fractional, or non-finite; `resolve` makes sense of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRequest {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RegionRequest {
    /// The whole image, whatever its size turns out to be.
    pub fn full() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: f64::INFINITY,
            height: f64::INFINITY,
        }
    }

    /// Parse `left,top,width,height`. Parsing is total: missing or
    /// unparseable fields fall back to 0 for offsets and to the full
    /// remaining extent for sizes.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',').map(|part| part.trim().parse::<f64>().ok());
        Self {
            left: parts.next().flatten().unwrap_or(0.0),
            top: parts.next().flatten().unwrap_or(0.0),
            width: parts.next().flatten().unwrap_or(f64::INFINITY),
            height: parts.next().flatten().unwrap_or(f64::INFINITY),
        }
    }
}

/// Clamp a requested rectangle to the actual image bounds.
///
/// Order matters: offsets are fixed first, extents second, so an oversized
/// box at a valid offset keeps the offset and shrinks, rather than sliding
/// back toward the origin.
pub fn resolve(image_width: u32, image_height: u32, req: RegionRequest) -> Region {
    let left = clamp_offset(req.left, image_width);
    let top = clamp_offset(req.top, image_height);
    let width = clamp_extent(req.width, image_width.saturating_sub(left));
    let height = clamp_extent(req.height, image_height.saturating_sub(top));
    Region {
        left,
        top,
        width,
        height,
    }
}

fn clamp_offset(value: f64, limit: u32) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    // f64 -> u64 casts saturate, so huge offsets land on the last pixel
    (value.max(0.0) as u64).min(u64::from(limit.saturating_sub(1))) as u32
}

fn clamp_extent(value: f64, remaining: u32) -> u32 {
    let remaining = remaining.max(1);
    if !value.is_finite() {
        return remaining;
    }
    (value.max(1.0) as u64).min(u64::from(remaining)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(region: Region, width: u32, height: u32) -> bool {
        region.width >= 1
            && region.height >= 1
            && region.left + region.width <= width
            && region.top + region.height <= height
    }

    #[test]
    fn test_in_bounds_request_is_untouched() {
        let region = resolve(
            1280,
            800,
            RegionRequest {
                left: 0.0,
                top: 50.0,
                width: 1270.0,
                height: 250.0,
            },
        );
        assert_eq!(
            region,
            Region {
                left: 0,
                top: 50,
                width: 1270,
                height: 250
            }
        );
    }

    #[test]
    fn test_oversized_extents_clamp_to_remaining_space() {
        let region = resolve(
            1280,
            800,
            RegionRequest {
                left: 0.0,
                top: 50.0,
                width: 5000.0,
                height: 5000.0,
            },
        );
        assert_eq!(
            region,
            Region {
                left: 0,
                top: 50,
                width: 1280,
                height: 750
            }
        );
    }

    #[test]
    fn test_offset_wins_over_extent() {
        // Offset clamps to the last pixel first; the extent then gets
        // whatever single column/row is left.
        let region = resolve(
            100,
            100,
            RegionRequest {
                left: 500.0,
                top: 500.0,
                width: 500.0,
                height: 500.0,
            },
        );
        assert_eq!(
            region,
            Region {
                left: 99,
                top: 99,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn test_negative_and_fractional_inputs() {
        let region = resolve(
            640,
            480,
            RegionRequest {
                left: -10.0,
                top: 4.9,
                width: 0.2,
                height: -3.0,
            },
        );
        assert_eq!(region.left, 0);
        assert_eq!(region.top, 4);
        assert_eq!(region.width, 1);
        assert_eq!(region.height, 1);
    }

    #[test]
    fn test_non_finite_inputs_fall_back() {
        let region = resolve(
            640,
            480,
            RegionRequest {
                left: f64::NAN,
                top: f64::NEG_INFINITY,
                width: f64::NAN,
                height: f64::INFINITY,
            },
        );
        assert_eq!(
            region,
            Region {
                left: 0,
                top: 0,
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn test_resolution_always_lands_inside_the_image() {
        let requests = [
            (0.0, 0.0, 1.0, 1.0),
            (1e12, 1e12, 1e12, 1e12),
            (-1e12, -1e12, 0.0, 0.0),
            (639.0, 479.0, 2.0, 2.0),
            (320.0, 240.0, 320.0, 240.0),
            (f64::NAN, 10.0, f64::INFINITY, 0.5),
        ];
        for (left, top, width, height) in requests {
            let region = resolve(
                640,
                480,
                RegionRequest {
                    left,
                    top,
                    width,
                    height,
                },
            );
            assert!(
                inside(region, 640, 480),
                "request ({left},{top},{width},{height}) resolved outside: {region:?}"
            );
        }
    }

    #[test]
    fn test_parse_complete_box() {
        let req = RegionRequest::parse("0,50,1270,250");
        assert_eq!(req.left, 0.0);
        assert_eq!(req.top, 50.0);
        assert_eq!(req.width, 1270.0);
        assert_eq!(req.height, 250.0);
    }

    #[test]
    fn test_parse_tolerates_garbage_and_missing_fields() {
        let req = RegionRequest::parse("abc,5");
        assert_eq!(req.left, 0.0);
        assert_eq!(req.top, 5.0);
        assert!(req.width.is_infinite());
        assert!(req.height.is_infinite());

        let req = RegionRequest::parse("");
        assert_eq!(resolve(1280, 800, req), resolve(1280, 800, RegionRequest::full()));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let req = RegionRequest::parse(" 10 , 20 , 30 , 40 ");
        assert_eq!(req.left, 10.0);
        assert_eq!(req.top, 20.0);
        assert_eq!(req.width, 30.0);
        assert_eq!(req.height, 40.0);
    }
}
