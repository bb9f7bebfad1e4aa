//! Item database and stat modifiers
//!
//! Silver items add to a stat modifier, gold items unlock an ability.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Health,
    MoveSpeed,
    JumpHeight,
    AttackDamage,
    /// Lower is faster
    AttackSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemTier {
    Silver,
    Gold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    DoubleJump,
}

/// Additive change to a stat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemEffect {
    pub stat: StatType,
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemData {
    pub name: &'static str,
    pub description: &'static str,
    pub tier: ItemTier,
    pub rarity: Rarity,
    pub effects: &'static [ItemEffect],
    pub ability: Option<Ability>,
    pub icon_color: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemId {
    IronWeight,
    WingedBoots,
    HeartContainer,
    SwiftBlade,
    MoonStone,
    HermesFeather,
}

impl ItemId {
    pub const ALL: [ItemId; 6] = [
        ItemId::IronWeight,
        ItemId::WingedBoots,
        ItemId::HeartContainer,
        ItemId::SwiftBlade,
        ItemId::MoonStone,
        ItemId::HermesFeather,
    ];

    pub fn data(self) -> ItemData {
        match self {
            ItemId::IronWeight => ItemData {
                name: "Iron Weight",
                description: "Increases Attack Damage by 20%",
                tier: ItemTier::Silver,
                rarity: Rarity::Common,
                effects: &[ItemEffect { stat: StatType::AttackDamage, value: 0.2 }],
                ability: None,
                icon_color: 0xaaaaaa,
            },
            ItemId::WingedBoots => ItemData {
                name: "Winged Boots",
                description: "Increases Move Speed by 15%",
                tier: ItemTier::Silver,
                rarity: Rarity::Uncommon,
                effects: &[ItemEffect { stat: StatType::MoveSpeed, value: 0.15 }],
                ability: None,
                icon_color: 0x00ffff,
            },
            ItemId::HeartContainer => ItemData {
                name: "Heart Container",
                description: "Increases Max Health by 1",
                tier: ItemTier::Silver,
                rarity: Rarity::Rare,
                effects: &[ItemEffect { stat: StatType::Health, value: 1.0 }],
                ability: None,
                icon_color: 0xff0000,
            },
            ItemId::SwiftBlade => ItemData {
                name: "Swift Blade",
                description: "Increases Attack Speed by 15%",
                tier: ItemTier::Silver,
                rarity: Rarity::Uncommon,
                effects: &[ItemEffect { stat: StatType::AttackSpeed, value: -0.15 }],
                ability: None,
                icon_color: 0x0000ff,
            },
            ItemId::MoonStone => ItemData {
                name: "Moon Stone",
                description: "Increases Jump Height by 15%",
                tier: ItemTier::Silver,
                rarity: Rarity::Rare,
                effects: &[ItemEffect { stat: StatType::JumpHeight, value: 0.15 }],
                ability: None,
                icon_color: 0xaaaa00,
            },
            ItemId::HermesFeather => ItemData {
                name: "Hermes Feather",
                description: "Grants Double Jump",
                tier: ItemTier::Gold,
                rarity: Rarity::Legendary,
                effects: &[],
                ability: Some(Ability::DoubleJump),
                icon_color: 0xffd700,
            },
        }
    }

    /// Uniform pick among silver items
    pub fn random_silver(rng: &mut Pcg32) -> ItemId {
        let silver: Vec<ItemId> = ItemId::ALL
            .into_iter()
            .filter(|id| id.data().tier == ItemTier::Silver)
            .collect();
        silver[rng.random_range(0..silver.len())]
    }
}

/// Accumulated additive modifiers (0 = unmodified)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatModifiers {
    pub move_speed: f32,
    pub jump_height: f32,
    pub attack_damage: f32,
    pub attack_speed: f32,
}

impl StatModifiers {
    pub fn get(&self, stat: StatType) -> f32 {
        match stat {
            StatType::MoveSpeed => self.move_speed,
            StatType::JumpHeight => self.jump_height,
            StatType::AttackDamage => self.attack_damage,
            StatType::AttackSpeed => self.attack_speed,
            // Health is applied directly to the pool
            StatType::Health => 0.0,
        }
    }

    pub fn add(&mut self, stat: StatType, value: f32) {
        match stat {
            StatType::MoveSpeed => self.move_speed += value,
            StatType::JumpHeight => self.jump_height += value,
            StatType::AttackDamage => self.attack_damage += value,
            StatType::AttackSpeed => self.attack_speed += value,
            StatType::Health => {}
        }
    }

    /// `base × class multiplier × (1 + modifier)`
    pub fn apply(&self, stat: StatType, base: f32, class_mult: f32) -> f32 {
        base * class_mult * (1.0 + self.get(stat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_item_table() {
        assert_eq!(ItemId::HermesFeather.data().ability, Some(Ability::DoubleJump));
        assert!(ItemId::HermesFeather.data().effects.is_empty());
        assert_eq!(ItemId::SwiftBlade.data().effects[0].value, -0.15);
        assert!(ItemId::ALL.iter().all(|id| !id.data().name.is_empty()));
    }

    #[test]
    fn test_modifiers_stack() {
        let mut mods = StatModifiers::default();
        mods.add(StatType::MoveSpeed, 0.15);
        mods.add(StatType::MoveSpeed, 0.15);
        assert!((mods.apply(StatType::MoveSpeed, 200.0, 1.25) - 325.0).abs() < 1e-3);
        mods.add(StatType::Health, 1.0);
        assert_eq!(mods.get(StatType::Health), 0.0);
    }

    #[test]
    fn test_random_silver_never_gold() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(ItemId::random_silver(&mut rng).data().tier, ItemTier::Silver);
        }
    }
}
