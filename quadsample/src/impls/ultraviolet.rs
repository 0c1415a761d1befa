use ultraviolet::DVec2;

super::impl_point!(DVec2);
