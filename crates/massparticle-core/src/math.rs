use glam::Vec3;

/// GLSL-style `mix(a, b, t)` for scalars.
#[inline]
pub fn mix_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Closest point to `p` on the segment `a..b`. Degenerate segments collapse to `a`.
#[inline]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on the infinite line through `origin` along unit `axis`.
#[inline]
pub fn closest_point_on_line(p: Vec3, origin: Vec3, axis: Vec3) -> Vec3 {
    origin + axis * (p - origin).dot(axis)
}

/// `v` with its component along unit `n` replaced by `-bounce` times itself,
/// but only while `v` points into the surface (`v . n < 0`).
#[inline]
pub fn reflect_inward(v: Vec3, n: Vec3, bounce: f32) -> Vec3 {
    let vn = v.dot(n);
    if vn < 0.0 {
        v - n * vn * (1.0 + bounce)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec3::new(-1.0, 1.0, 0.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec3::new(3.0, 1.0, 0.0), a, b), b);
        assert_eq!(
            closest_point_on_segment(Vec3::new(1.0, 5.0, 0.0), a, b),
            Vec3::new(1.0, 0.0, 0.0)
        );
        assert_eq!(closest_point_on_segment(Vec3::ONE, a, a), a);
    }

    #[test]
    fn test_reflect_inward_only_when_approaching() {
        let n = Vec3::Y;
        let v = Vec3::new(1.0, -2.0, 0.0);
        assert_eq!(reflect_inward(v, n, 1.0), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(reflect_inward(v, n, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let away = Vec3::new(0.0, 3.0, 0.0);
        assert_eq!(reflect_inward(away, n, 1.0), away);
    }

    #[test]
    fn test_mix() {
        assert_eq!(mix_f32(2.0, 4.0, 0.5), 3.0);
        assert_eq!(mix_f32(2.0, 4.0, 0.0), 2.0);
    }
}
