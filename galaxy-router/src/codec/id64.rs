//! Packed system address (id64) decoding and encoding.
//!
//! A system id64 packs, from the least significant bit up:
//!
//! | Field | Width (bits) |
//! |-------|--------------|
//! | mass code | 3 |
//! | z: sector (7) + boxel (7 - mc) | 14 - mc |
//! | y: sector (6) + boxel (7 - mc) | 13 - mc |
//! | x: sector (7) + boxel (7 - mc) | 14 - mc |
//! | sequence within the boxel | 11 + 3·mc |
//! | body id | 9 |
//!
//! where `mc` is the mass code (0 for `a` .. 7 for `h`). Denser regions use
//! lower mass codes and therefore smaller boxels: a boxel of mass code `mc`
//! is `10 · 2^mc` light years on a side. The layout always adds up to 64 bits,
//! so every id64 decodes and re-encodes to itself.
//!
//! Decoding only ever recovers *which boxel* a system lives in, never its
//! exact position.

use galaxy_router_spatial::{BoundingBox, Point3};

use super::galaxy::{GALAXY_ORIGIN, MIN_BOXEL_SIZE, SECTOR_COUNTS, SECTOR_SIZE};
use crate::errors::{ErrorKind, RouterError, RouterResult};

const MASS_CODE_BITS: u32 = 3;
const BODY_ID_SHIFT: u32 = 55;
const BODY_ID_BITS: u32 = 9;
const SECTOR_BITS: [u32; 3] = [7, 6, 7];

/// Boxel size class of a system address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MassCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl MassCode {
    pub const ALL: [MassCode; 8] = [
        MassCode::A,
        MassCode::B,
        MassCode::C,
        MassCode::D,
        MassCode::E,
        MassCode::F,
        MassCode::G,
        MassCode::H,
    ];

    /// Mass code stored in the lowest three bits of `id64`.
    pub fn from_id64(id64: u64) -> MassCode {
        Self::ALL[(id64 & 0b111) as usize]
    }

    /// Parses the lowercase letter used in procedural system names.
    pub fn from_letter(letter: char) -> Option<MassCode> {
        match letter {
            'a'..='h' => Some(Self::ALL[(letter as u8 - b'a') as usize]),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        (b'a' + self as u8) as char
    }

    /// Numeric value, 0 for `a` through 7 for `h`.
    pub fn value(self) -> u32 {
        self as u32
    }

    /// Boxel edge length in light years.
    pub fn boxel_size(self) -> f64 {
        MIN_BOXEL_SIZE * f64::from(1u32 << self.value())
    }

    /// Bits of boxel position per axis.
    pub fn boxel_bits(self) -> u32 {
        7 - self.value()
    }

    /// Boxels along one edge of a sector.
    pub fn boxels_per_sector(self) -> u32 {
        1 << self.boxel_bits()
    }

    /// Width of the sequence field.
    pub fn sequence_bits(self) -> u32 {
        11 + 3 * self.value()
    }

    /// Bit offsets of the x, y and z fields.
    fn axis_shifts(self) -> [u32; 3] {
        let m = self.value();
        [30 - 2 * m, 17 - m, MASS_CODE_BITS]
    }

    /// Widths of the x, y and z fields.
    fn axis_widths(self) -> [u32; 3] {
        let b = self.boxel_bits();
        [SECTOR_BITS[0] + b, SECTOR_BITS[1] + b, SECTOR_BITS[2] + b]
    }

    fn sequence_shift(self) -> u32 {
        44 - 3 * self.value()
    }
}

impl std::fmt::Display for MassCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The spatial fields packed into a system id64.
///
/// # Examples
///
/// ```rust
/// use galaxy_router::codec::{MassCode, SystemAddress};
///
/// let sol = SystemAddress::decode(10477373803);
/// assert_eq!(sol.mass_code, MassCode::D);
/// assert_eq!(sol.sector, [39, 32, 18]);
/// assert_eq!(sol.encode().unwrap(), 10477373803);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemAddress {
    pub mass_code: MassCode,
    /// Sector grid cell (x, y, z)
    pub sector: [u32; 3],
    /// Boxel position inside the sector, in units of the mass code's boxel size
    pub boxel: [u32; 3],
    /// Index of the system within its boxel
    pub sequence: u32,
    /// Body id, zero for the system itself
    pub body_id: u16,
}

impl SystemAddress {
    /// Decodes every field of `id64`.
    ///
    /// Shifts and masks only; every 64-bit value is a valid address.
    pub fn decode(id64: u64) -> SystemAddress {
        let mass_code = MassCode::from_id64(id64);
        let shifts = mass_code.axis_shifts();
        let widths = mass_code.axis_widths();
        let boxel_bits = mass_code.boxel_bits();

        let mut sector = [0u32; 3];
        let mut boxel = [0u32; 3];
        for axis in 0..3 {
            let packed = extract(id64, shifts[axis], widths[axis]) as u32;
            sector[axis] = packed >> boxel_bits;
            boxel[axis] = packed & ((1 << boxel_bits) - 1);
        }

        SystemAddress {
            mass_code,
            sector,
            boxel,
            sequence: extract(id64, mass_code.sequence_shift(), mass_code.sequence_bits()) as u32,
            body_id: extract(id64, BODY_ID_SHIFT, BODY_ID_BITS) as u16,
        }
    }

    /// Packs the fields back into an id64.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] if any field exceeds its bit width.
    pub fn encode(&self) -> RouterResult<u64> {
        self.check_ranges()?;
        let mc = self.mass_code;
        let shifts = mc.axis_shifts();
        let boxel_bits = mc.boxel_bits();

        let mut id64 = u64::from(mc.value());
        for axis in 0..3 {
            let packed = (u64::from(self.sector[axis]) << boxel_bits) | u64::from(self.boxel[axis]);
            id64 |= packed << shifts[axis];
        }
        id64 |= u64::from(self.sequence) << mc.sequence_shift();
        id64 |= u64::from(self.body_id) << BODY_ID_SHIFT;
        Ok(id64)
    }

    /// Address of the boxel of the given mass code that contains `point`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] if `point` lies outside the sector grid.
    pub fn locate(point: &Point3, mass_code: MassCode, sequence: u32) -> RouterResult<SystemAddress> {
        let relative = [
            point.x - GALAXY_ORIGIN.x,
            point.y - GALAXY_ORIGIN.y,
            point.z - GALAXY_ORIGIN.z,
        ];
        let boxel_size = mass_code.boxel_size();
        let last_boxel = mass_code.boxels_per_sector() - 1;

        let mut sector = [0u32; 3];
        let mut boxel = [0u32; 3];
        for axis in 0..3 {
            let extent = f64::from(SECTOR_COUNTS[axis]) * SECTOR_SIZE;
            if !(0.0..extent).contains(&relative[axis]) {
                return Err(RouterError::new(
                    &format!("{} lies outside the sector grid", point),
                    ErrorKind::InvalidArgument,
                ));
            }
            sector[axis] = (relative[axis] / SECTOR_SIZE).floor() as u32;
            let within = relative[axis] - f64::from(sector[axis]) * SECTOR_SIZE;
            boxel[axis] = ((within / boxel_size).floor() as u32).min(last_boxel);
        }

        let address = SystemAddress {
            mass_code,
            sector,
            boxel,
            sequence,
            body_id: 0,
        };
        address.check_ranges()?;
        Ok(address)
    }

    /// The same address with the body id cleared.
    pub fn system(&self) -> SystemAddress {
        SystemAddress {
            body_id: 0,
            ..*self
        }
    }

    /// Minimum corner of the sector, in light years.
    pub fn sector_origin(&self) -> Point3 {
        Point3::new(
            GALAXY_ORIGIN.x + f64::from(self.sector[0]) * SECTOR_SIZE,
            GALAXY_ORIGIN.y + f64::from(self.sector[1]) * SECTOR_SIZE,
            GALAXY_ORIGIN.z + f64::from(self.sector[2]) * SECTOR_SIZE,
        )
    }

    /// Minimum corner of the boxel, in light years.
    pub fn boxel_origin(&self) -> Point3 {
        let size = self.mass_code.boxel_size();
        let sector = self.sector_origin();
        Point3::new(
            sector.x + f64::from(self.boxel[0]) * size,
            sector.y + f64::from(self.boxel[1]) * size,
            sector.z + f64::from(self.boxel[2]) * size,
        )
    }

    /// Center of the boxel: the best position estimate the id64 allows.
    pub fn boxel_center(&self) -> Point3 {
        let half = self.mass_code.boxel_size() / 2.0;
        let origin = self.boxel_origin();
        Point3::new(origin.x + half, origin.y + half, origin.z + half)
    }

    /// Bounds of the boxel.
    pub fn boxel_bounds(&self) -> BoundingBox {
        let size = self.mass_code.boxel_size();
        let origin = self.boxel_origin();
        BoundingBox::new(
            origin,
            Point3::new(origin.x + size, origin.y + size, origin.z + size),
        )
    }

    /// Whether `point` falls in this boxel (minimum faces inclusive).
    pub fn boxel_contains(&self, point: &Point3) -> bool {
        let bounds = self.boxel_bounds();
        point.x >= bounds.min.x
            && point.x < bounds.max.x
            && point.y >= bounds.min.y
            && point.y < bounds.max.y
            && point.z >= bounds.min.z
            && point.z < bounds.max.z
    }

    fn check_ranges(&self) -> RouterResult<()> {
        let mc = self.mass_code;
        for axis in 0..3 {
            if self.sector[axis] >= SECTOR_COUNTS[axis] {
                return Err(out_of_range("sector", axis, self.sector[axis]));
            }
            if self.boxel[axis] >= mc.boxels_per_sector() {
                return Err(out_of_range("boxel", axis, self.boxel[axis]));
            }
        }
        if u64::from(self.sequence) >= 1u64 << mc.sequence_bits() {
            return Err(RouterError::new(
                &format!(
                    "sequence {} does not fit mass code {} ({} bits)",
                    self.sequence,
                    mc,
                    mc.sequence_bits()
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        if u32::from(self.body_id) >= 1 << BODY_ID_BITS {
            return Err(RouterError::new(
                &format!("body id {} exceeds {} bits", self.body_id, BODY_ID_BITS),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(())
    }
}

fn extract(id64: u64, shift: u32, width: u32) -> u64 {
    (id64 >> shift) & ((1u64 << width) - 1)
}

fn out_of_range(field: &str, axis: usize, value: u32) -> RouterError {
    let axis = ["x", "y", "z"][axis];
    RouterError::new(
        &format!("{} {} coordinate {} out of range", field, axis, value),
        ErrorKind::InvalidArgument,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SOL: u64 = 10477373803;

    #[test]
    fn test_decode_sol() {
        let sol = SystemAddress::decode(SOL);
        assert_eq!(sol.mass_code, MassCode::D);
        assert_eq!(sol.sector, [39, 32, 18]);
        assert_eq!(sol.boxel, [0, 0, 13]);
        assert_eq!(sol.sequence, 0);
        assert_eq!(sol.body_id, 0);
    }

    #[test]
    fn test_sol_boxel_geometry() {
        let sol = SystemAddress::decode(SOL);
        assert_eq!(sol.sector_origin(), Point3::new(-65.0, -25.0, -1065.0));
        assert_eq!(sol.boxel_origin(), Point3::new(-65.0, -25.0, -25.0));
        assert_eq!(sol.boxel_center(), Point3::new(-25.0, 15.0, 15.0));
        assert!(sol.boxel_contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(!sol.boxel_contains(&Point3::new(15.0, 0.0, 0.0)));
    }

    #[test]
    fn test_locate_sol() {
        let address = SystemAddress::locate(&Point3::new(0.0, 0.0, 0.0), MassCode::D, 0).unwrap();
        assert_eq!(address, SystemAddress::decode(SOL));
        assert_eq!(address.encode().unwrap(), SOL);
    }

    #[test]
    fn test_locate_outside_grid() {
        let err = SystemAddress::locate(&Point3::new(-60000.0, 0.0, 0.0), MassCode::A, 0)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_round_trip_every_mass_code() {
        let mut rng = StdRng::seed_from_u64(64);
        for _ in 0..10_000 {
            let id64: u64 = rng.gen();
            let address = SystemAddress::decode(id64);
            assert_eq!(address.encode().unwrap(), id64, "id64 {:#x}", id64);
        }
        for mc in MassCode::ALL {
            let id64 = u64::MAX & !0b111 | u64::from(mc.value());
            assert_eq!(SystemAddress::decode(id64).encode().unwrap(), id64);
        }
    }

    #[test]
    fn test_field_widths() {
        for mc in MassCode::ALL {
            let axes: u32 = mc.axis_widths().iter().sum();
            assert_eq!(MASS_CODE_BITS + axes + mc.sequence_bits() + BODY_ID_BITS, 64);
            assert_eq!(mc.sequence_shift() + mc.sequence_bits(), BODY_ID_SHIFT);
        }
        assert_eq!(MassCode::H.boxels_per_sector(), 1);
        assert_eq!(MassCode::H.sequence_bits(), 32);
        assert_eq!(MassCode::A.boxel_size(), 10.0);
        assert_eq!(MassCode::H.boxel_size(), 1280.0);
    }

    #[test]
    fn test_distinct_sequences_stay_in_one_boxel() {
        let a = SystemAddress::decode(SOL);
        let b = SystemAddress { sequence: 34, ..a };
        let b_id = b.encode().unwrap();
        assert_ne!(b_id, SOL);
        let decoded = SystemAddress::decode(b_id);
        assert_eq!(decoded.sector, a.sector);
        assert_eq!(decoded.boxel, a.boxel);
        assert_eq!(decoded.sequence, 34);
    }

    #[test]
    fn test_encode_rejects_out_of_range() {
        let mut address = SystemAddress::decode(SOL);
        address.sector[1] = 64;
        assert_eq!(address.encode().unwrap_err().kind(), &ErrorKind::InvalidArgument);

        let mut address = SystemAddress::decode(SOL);
        address.boxel[0] = 16;
        assert!(address.encode().is_err());

        let mut address = SystemAddress::decode(SOL);
        address.sequence = 1 << 20;
        assert!(address.encode().is_err());

        let mut address = SystemAddress::decode(SOL);
        address.body_id = 512;
        assert!(address.encode().is_err());
    }

    #[test]
    fn test_body_id_and_system() {
        let with_body = SOL | (5u64 << BODY_ID_SHIFT);
        let address = SystemAddress::decode(with_body);
        assert_eq!(address.body_id, 5);
        assert_eq!(address.system().encode().unwrap(), SOL);
    }

    #[test]
    fn test_mass_code_letters() {
        assert_eq!(MassCode::from_letter('a'), Some(MassCode::A));
        assert_eq!(MassCode::from_letter('h'), Some(MassCode::H));
        assert_eq!(MassCode::from_letter('i'), None);
        assert_eq!(MassCode::D.letter(), 'd');
        assert_eq!(MassCode::from_id64(SOL).to_string(), "d");
    }
}
