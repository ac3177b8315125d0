// Palettes Module - Built-in wheel color palettes and catalog selection
use anyhow::{bail, Result};
use std::rc::Rc;

use crate::policy::GenerationPolicy;
use crate::types::Rgba;

/// Named set of colors, one per drawing role of a wheel
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: &'static str,
    pub outer: Rgba,
    pub ring1: Rgba,
    pub ring2: Rgba,
    pub ring3: Rgba,
    pub dots1: Rgba,
    pub dots2: Rgba,
    pub dots3: Rgba,
    pub rays: Rgba,
    pub inner: Rgba,
    pub center: Rgba,
    pub tail: Rgba,
}

const fn hex(v: u32) -> Rgba {
    Rgba::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

// Role order: outer, ring1, ring2, ring3, dots1, dots2, dots3, rays, inner, center, tail
const BUILTIN: [(&str, [u32; 11]); 10] = [
    ("blush", [0xFFFFFF, 0xFF7EB6, 0xFF96BF, 0xFFB7D4, 0xE83432, 0xFFFFFF, 0xFF7AAE, 0xFF4C8B, 0xE92D72, 0x000000, 0xFF4F9D]),
    ("tangerine", [0xFF9A00, 0xFFAF37, 0xFFC260, 0xFFDD9E, 0xE83432, 0xFF81B9, 0xFF507C, 0xE83432, 0xFF4D84, 0x000000, 0xFF4F9D]),
    ("orchid", [0xFEC850, 0xF7A6D8, 0xE86AB8, 0xB857B0, 0xB52A8B, 0xF5B3D9, 0xF43EA1, 0xB52A8B, 0xFF66C4, 0x000000, 0xFF3D72]),
    ("lavender", [0xFFFFFF, 0xC77ADD, 0xA75BC7, 0x7E4AA8, 0xE83432, 0xFFFFFF, 0xD47BE0, 0xE83432, 0x6AEB76, 0x000000, 0xFF4FA7]),
    ("meadow", [0xFFFFFF, 0x91EA7C, 0xC2FAB8, 0xF47FC2, 0x2E9F37, 0xC3F9C4, 0xF85AA4, 0x2E9F37, 0xFF5AAD, 0x000000, 0xFF4FA0]),
    ("marigold", [0xFDBA3B, 0xFFDD85, 0xFFEEC0, 0xF79F2D, 0x1B3C88, 0xFFFFFF, 0xC682CA, 0x1B3C88, 0xE93D67, 0x000000, 0xFF4F9C]),
    ("carnival", [0xFDC54C, 0xF275BD, 0xC964C5, 0x66A4C0, 0xC76A00, 0xFDC54C, 0xEF75D1, 0xC76A00, 0x9ECCE0, 0x000000, 0xFF4F9D]),
    ("rosewood", [0xFFFFFF, 0xF38DBF, 0xF05C8E, 0xD64A72, 0xE83432, 0xFFFFFF, 0xED5393, 0xE83432, 0x6EB66A, 0x000000, 0xFF4FA0]),
    ("lagoon", [0x234BA0, 0x7ACD8A, 0xED5AAA, 0xD96A98, 0x0D2C75, 0x1F46A3, 0xB05CCD, 0x0D2C75, 0xE63C45, 0x000000, 0xFF4FA0]),
    ("ember", [0xEFB23A, 0xF47FBB, 0x6B75A0, 0x363939, 0x26488F, 0xFCEDC6, 0xED5B5E, 0x26488F, 0xF4343D, 0x000000, 0xFF4FA7]),
];

impl Palette {
    fn from_table(name: &'static str, c: &[u32; 11]) -> Self {
        Palette {
            name,
            outer: hex(c[0]),
            ring1: hex(c[1]),
            ring2: hex(c[2]),
            ring3: hex(c[3]),
            dots1: hex(c[4]),
            dots2: hex(c[5]),
            dots3: hex(c[6]),
            rays: hex(c[7]),
            inner: hex(c[8]),
            center: hex(c[9]),
            tail: hex(c[10]),
        }
    }
}

/// Fixed, non-empty collection of palettes that wheels draw from
#[derive(Debug, Clone)]
pub struct PaletteCatalog {
    palettes: Vec<Rc<Palette>>,
}

impl PaletteCatalog {
    pub fn builtin() -> Self {
        PaletteCatalog {
            palettes: BUILTIN
                .iter()
                .map(|(name, colors)| Rc::new(Palette::from_table(name, colors)))
                .collect(),
        }
    }

    /// Build a catalog from a selection string: "all" or comma-separated palette names
    pub fn from_selection(selection: &str) -> Result<Self> {
        let selection = selection.trim();
        if selection.is_empty() || selection.eq_ignore_ascii_case("all") {
            return Ok(Self::builtin());
        }
        let names: Vec<&str> = selection.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
        Self::filtered(&names)
    }

    /// Keep only the named built-in palettes, in catalog order
    pub fn filtered(names: &[&str]) -> Result<Self> {
        let all = Self::builtin();
        for name in names {
            if !all.palettes.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
                bail!(
                    "Unknown palette '{}' (available: {})",
                    name,
                    all.names().join(", ")
                );
            }
        }

        let palettes: Vec<Rc<Palette>> = all
            .palettes
            .into_iter()
            .filter(|p| names.iter().any(|n| p.name.eq_ignore_ascii_case(n)))
            .collect();

        if palettes.is_empty() {
            bail!("Palette selection is empty");
        }
        Ok(PaletteCatalog { palettes })
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.palettes.iter().map(|p| p.name).collect()
    }

    /// Uniform pick with replacement; every call is independent
    pub fn pick<P: GenerationPolicy + ?Sized>(&self, policy: &mut P) -> Rc<Palette> {
        let index = policy.choose_index(self.palettes.len());
        Rc::clone(&self.palettes[index.min(self.palettes.len() - 1)])
    }
}
