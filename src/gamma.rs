// Gamma-correct compositing for brush edges.
// Partially covered pixels are mixed in linear light, so anti-aliased stroke
// edges don't look thin or dark. Table lookups replace powf on the hot path.

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    /// Build both tables once per surface.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = (i as f32) / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Cover `dst` with `src` at `alpha` (0..1), both 0x00RRGGBB.
    /// alpha <= 0 keeps dst, alpha >= 1 is a plain overwrite.
    #[inline]
    pub fn mix(&self, dst: u32, src: u32, alpha: f32) -> u32 {
        if alpha <= 0.0 {
            return dst;
        }
        if alpha >= 1.0 {
            return src;
        }
        let inv = 1.0 - alpha;
        let channel = |shift: u32| {
            let d = self.srgb_u8_to_linear(((dst >> shift) & 0xFF) as u8);
            let s = self.srgb_u8_to_linear(((src >> shift) & 0xFF) as u8);
            (self.linear_to_srgb_u8(alpha * s + inv * d) as u32) << shift
        };
        channel(16) | channel(8) | channel(0)
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_round_trip_every_byte() {
        let lut = GammaLut::new();
        for v in 0..=255u8 {
            assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(v)), v);
        }
    }

    #[test]
    fn mix_endpoints_are_exact() {
        let lut = GammaLut::new();
        assert_eq!(lut.mix(0x00_12_34_56, 0x00_FF_00_00, 0.0), 0x00_12_34_56);
        assert_eq!(lut.mix(0x00_12_34_56, 0x00_FF_00_00, 1.0), 0x00_FF_00_00);
    }

    #[test]
    fn half_mix_is_brighter_than_naive_average() {
        let lut = GammaLut::new();
        let mixed = lut.mix(0x00_00_00_00, 0x00_FF_FF_FF, 0.5);
        // linear-light midpoint of black/white is ~188 in sRGB, not 128
        assert!((mixed & 0xFF) > 170);
    }
}
