//! Weapon catalogue
//!
//! Only `Explosive` and `Generative` styles change terrain. The remaining
//! styles are recognized and deliberately leave the board untouched.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How a weapon interacts with terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponStyle {
    /// Carves a spherical crater
    Explosive,
    /// Deposits a spherical mound
    Generative,
    Mud,
    Napalm,
    Mirv,
}

impl WeaponStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponStyle::Explosive => "Explosive",
            WeaponStyle::Generative => "Generative",
            WeaponStyle::Mud => "Mud",
            WeaponStyle::Napalm => "Napalm",
            WeaponStyle::Mirv => "MIRV",
        }
    }
}

/// One purchasable size of a weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSize {
    pub name: String,
    /// Carve/accrete radius
    pub size: f32,
    /// Point cost per shot
    pub cost: i64,
}

impl WeaponSize {
    pub fn new(name: &str, size: f32, cost: i64) -> Self {
        Self {
            name: name.to_string(),
            size,
            cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub style: WeaponStyle,
    /// Ordered smallest to largest
    pub sizes: Vec<WeaponSize>,
}

impl Weapon {
    pub fn new(name: &str, style: WeaponStyle, sizes: Vec<WeaponSize>) -> Self {
        Self {
            name: name.to_string(),
            style,
            sizes,
        }
    }
}

/// Built-in catalogue; index 0 is the base weapon and its first size is free
pub fn default_weapons() -> Vec<Weapon> {
    vec![
        Weapon::new(
            "Standard",
            WeaponStyle::Explosive,
            vec![
                WeaponSize::new("Baby", 10.0, 0),
                WeaponSize::new("Regular", 20.0, 100),
                WeaponSize::new("Large", 35.0, 250),
                WeaponSize::new("Nuke", 60.0, 1000),
            ],
        ),
        Weapon::new(
            "Dirt",
            WeaponStyle::Generative,
            vec![
                WeaponSize::new("Clod", 10.0, 50),
                WeaponSize::new("Pile", 20.0, 150),
                WeaponSize::new("Mountain", 35.0, 400),
            ],
        ),
        Weapon::new(
            "Mud",
            WeaponStyle::Mud,
            vec![WeaponSize::new("Splash", 20.0, 200)],
        ),
        Weapon::new(
            "Napalm",
            WeaponStyle::Napalm,
            vec![WeaponSize::new("Drum", 20.0, 300)],
        ),
        Weapon::new(
            "MIRV",
            WeaponStyle::Mirv,
            vec![WeaponSize::new("Cluster", 15.0, 500)],
        ),
    ]
}

/// Bounds-checked lookup of a weapon and one of its sizes
pub fn lookup(weapons: &[Weapon], weapon_id: usize, size_id: usize) -> Result<(&Weapon, &WeaponSize), SimError> {
    let invalid = || SimError::InvalidWeapon {
        weapon: weapon_id,
        size: size_id,
    };
    let weapon = weapons.get(weapon_id).ok_or_else(invalid)?;
    let size = weapon.sizes.get(size_id).ok_or_else(invalid)?;
    Ok((weapon, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_weapon_is_free_explosive() {
        let weapons = default_weapons();
        assert_eq!(weapons[0].style, WeaponStyle::Explosive);
        assert_eq!(weapons[0].sizes[0].cost, 0);
    }

    #[test]
    fn test_catalogue_covers_every_style() {
        let weapons = default_weapons();
        for style in [
            WeaponStyle::Explosive,
            WeaponStyle::Generative,
            WeaponStyle::Mud,
            WeaponStyle::Napalm,
            WeaponStyle::Mirv,
        ] {
            assert!(weapons.iter().any(|w| w.style == style), "missing {}", style.as_str());
        }
    }

    #[test]
    fn test_sizes_are_ordered() {
        for weapon in default_weapons() {
            for pair in weapon.sizes.windows(2) {
                assert!(pair[0].cost <= pair[1].cost);
                assert!(pair[0].size <= pair[1].size);
            }
        }
    }

    #[test]
    fn test_lookup_bounds() {
        let weapons = default_weapons();
        assert!(lookup(&weapons, 0, 3).is_ok());
        assert!(matches!(
            lookup(&weapons, 0, 4),
            Err(SimError::InvalidWeapon { weapon: 0, size: 4 })
        ));
        assert!(matches!(
            lookup(&weapons, 9, 0),
            Err(SimError::InvalidWeapon { weapon: 9, size: 0 })
        ));
    }
}
