use glam::DVec2;

super::impl_point!(DVec2);

#[cfg(test)]
mod tests {
    use super::*;

    super::super::tests_point!(glam_dvec2: DVec2 => DVec2::new);
}
