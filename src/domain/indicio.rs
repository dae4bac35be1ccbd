//! Evidence item (indicio) vocabulary

/// Accepted weight units for an evidence item
pub const UNIDADES_PESO: [&str; 4] = ["g", "kg", "lb", "oz"];

pub fn is_unidad_peso(value: &str) -> bool {
    UNIDADES_PESO.contains(&value)
}
