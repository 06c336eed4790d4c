//! Joins the segments of a bin into closed polygons.
//!
//! Segments that never touch the bin boundary are rings already. The others are joined level by level: from the exit
//! point of a segment the bin perimeter is followed to the nearest entry point of a segment of the same level, picking
//! up the perimeter points in between (segment crossings and bin corners). Land rings follow the perimeter
//! counter-clockwise and water rings clockwise, which gives every ring the winding of its level.
//!
//! If the bin interior is land that no segment bounds, a prefill polygon covering the whole bin is added first.

use std::collections::BTreeSet;

use log::debug;
use shoreline_types::geo::GeoPoint2d;
use shoreline_types::Winding;

use crate::bin::Bin;
use crate::error::ShorelineError;
use crate::grid::BinFrame;
use crate::perimeter::{PerimeterKey, Side, CLOSED_SIDE};
use crate::polygon::ShorePolygon;
use crate::segment::{Level, Segment};

/// Direction of the perimeter walk for one level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Orientation {
    /// Increasing keys, counter-clockwise. Used for land levels.
    Forward,
    /// Decreasing keys, clockwise. Used for water levels.
    Reverse,
}

impl Orientation {
    fn of(level: Level) -> Self {
        if level.is_land() {
            Self::Forward
        } else {
            Self::Reverse
        }
    }

    fn winding(self) -> Winding {
        match self {
            Self::Forward => Winding::CounterClockwise,
            Self::Reverse => Winding::Clockwise,
        }
    }

    fn is_reverse(self) -> bool {
        self == Self::Reverse
    }

    /// First key of the set at or after `key` in walk order, wrapping around.
    fn next_key(self, set: &BTreeSet<PerimeterKey>, key: PerimeterKey) -> Option<PerimeterKey> {
        match self {
            Self::Forward => set.range(key..).next().or_else(|| set.first()),
            Self::Reverse => set.range(..=key).next_back().or_else(|| set.last()),
        }
        .copied()
    }

    /// Entry at or after `key` in walk order, wrapping around. Among segments entering at the same key the one that
    /// comes first in the bin wins.
    fn next_entry(self, entries: &EntrySet, key: PerimeterKey) -> Option<(PerimeterKey, usize)> {
        match self {
            Self::Forward => entries
                .range((key, 0)..)
                .next()
                .or_else(|| entries.first())
                .copied(),
            Self::Reverse => {
                let &(key, _) = entries
                    .range(..=(key, usize::MAX))
                    .next_back()
                    .or_else(|| entries.last())?;
                entries.range((key, 0)..).next().copied()
            }
        }
    }
}

/// Entry keys of the segments of one level, paired with the segment position in the group.
type EntrySet = BTreeSet<(PerimeterKey, usize)>;

#[derive(Debug)]
struct OpenSegment<'a> {
    position: usize,
    segment: &'a Segment,
    entry: PerimeterKey,
    exit: PerimeterKey,
}

struct Assembly<'a> {
    bin: &'a Bin,
    frame: &'a BinFrame,
    perimeter: BTreeSet<PerimeterKey>,
}

/// Assembles the polygons of the bin in rendering order: the prefill polygon if one is needed, then the closed
/// segments, then the joined open segments.
pub(crate) fn assemble(bin: &Bin) -> Result<Vec<ShorePolygon>, ShorelineError> {
    let mut closed = vec![];
    let mut open = vec![];

    for (position, segment) in bin.segments().iter().enumerate() {
        let invalid = |reason| ShorelineError::InvalidGeometry {
            bin: bin.index(),
            segment: position,
            reason,
        };

        if segment.is_closed() {
            if segment.exit_side() != CLOSED_SIDE {
                return Err(invalid("closed segment leaves the bin"));
            }
            closed.push(segment);
            continue;
        }

        if Side::from_code(segment.entry_side()).is_none() {
            return Err(invalid("unknown entry side"));
        }

        match (segment.entry_key(), segment.exit_key()) {
            (Some(entry), Some(exit)) => open.push(OpenSegment {
                position,
                segment,
                entry,
                exit,
            }),
            (None, _) => return Err(invalid("open segment has no points")),
            (Some(_), None) if segment.exit_side() == CLOSED_SIDE => {
                return Err(invalid("open segment does not leave the bin"))
            }
            (Some(_), None) => return Err(invalid("unknown exit side")),
        }
    }

    // Stable, so segments of one level keep the bin order.
    open.sort_by_key(|item| item.segment.level());

    let mut perimeter: BTreeSet<PerimeterKey> =
        Side::ALL.iter().map(|&side| PerimeterKey::corner(side)).collect();
    for item in &open {
        perimeter.insert(item.entry);
        perimeter.insert(item.exit);
    }

    let assembly = Assembly {
        bin,
        frame: bin.frame(),
        perimeter,
    };

    let mut stitched = vec![];
    for group in open.chunk_by(|a, b| a.segment.level() == b.segment.level()) {
        assembly.stitch(group, &mut stitched)?;
    }

    let has_polygons = !closed.is_empty() || !stitched.is_empty();
    let prefill = if has_polygons {
        bin.segments()
            .iter()
            .map(Segment::level)
            .min()
            .is_some_and(Level::is_water)
    } else {
        bin.min_level().is_land()
    };

    let mut polygons = Vec::with_capacity(closed.len() + stitched.len() + 1);
    if prefill {
        polygons.push(assembly.prefill());
    }

    polygons.extend(closed.iter().map(|segment| {
        ShorePolygon::new(segment.locations(assembly.frame), segment.level().winding())
    }));
    polygons.extend(stitched);

    debug!(
        "Assembled bin {}: {} segments, {} polygons, prefill: {prefill}",
        bin.index(),
        bin.segments().len(),
        polygons.len()
    );

    Ok(polygons)
}

impl Assembly<'_> {
    fn stitch(
        &self,
        group: &[OpenSegment],
        polygons: &mut Vec<ShorePolygon>,
    ) -> Result<(), ShorelineError> {
        let Some(level) = group.first().map(|item| item.segment.level()) else {
            return Ok(());
        };
        let orientation = Orientation::of(level);

        let mut entries: EntrySet = group
            .iter()
            .enumerate()
            .map(|(i, item)| (item.entry, i))
            .collect();
        let mut remaining: BTreeSet<usize> = (0..group.len()).collect();

        while let Some(first) = remaining.pop_first() {
            let mut points = vec![];
            let mut current = first;
            let mut is_closed = false;

            // Every step consumes a segment other than the first one, so the ring closes within this many steps.
            for _ in 0..group.len() {
                let item = &group[current];
                points.extend(item.segment.locations(self.frame));

                if current != first {
                    entries.remove(&(item.entry, current));
                    remaining.remove(&current);
                }

                let (next_entry, next) = orientation
                    .next_entry(&entries, item.exit)
                    .ok_or_else(|| self.invalid(item, "no segment to continue the ring"))?;

                if next_entry != item.exit {
                    self.trace_perimeter(item, next_entry, orientation, &mut points)?;
                }

                if next == first {
                    is_closed = true;
                    break;
                }

                current = next;
            }

            if !is_closed {
                return Err(self.invalid(&group[first], "ring does not close"));
            }

            entries.remove(&(group[first].entry, first));
            polygons.push(ShorePolygon::new(points, orientation.winding()));
        }

        Ok(())
    }

    /// Appends the perimeter points strictly between the exit of `item` and `next_entry`.
    fn trace_perimeter(
        &self,
        item: &OpenSegment,
        next_entry: PerimeterKey,
        orientation: Orientation,
        points: &mut Vec<GeoPoint2d>,
    ) -> Result<(), ShorelineError> {
        let mut key = item.exit;
        for _ in 0..self.perimeter.len() {
            key = orientation
                .next_key(&self.perimeter, key.successor(orientation.is_reverse()))
                .ok_or_else(|| self.invalid(item, "empty perimeter"))?;

            if key == next_entry {
                return Ok(());
            }

            points.push(key.to_location(self.frame));
        }

        Err(self.invalid(item, "perimeter walk does not reach the next entry"))
    }

    fn prefill(&self) -> ShorePolygon {
        let points = self
            .perimeter
            .iter()
            .map(|key| key.to_location(self.frame))
            .collect();
        ShorePolygon::new(points, Winding::CounterClockwise)
    }

    fn invalid(&self, item: &OpenSegment, reason: &'static str) -> ShorelineError {
        ShorelineError::InvalidGeometry {
            bin: self.bin.index(),
            segment: item.position,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{assert_well_formed, bin, closed_segment, open_segment, record};
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use shoreline_types::geo::GeoPoint;
    use shoreline_types::GeoClosedContour;

    const LAND: Level = Level::LAND;
    const LAKE: Level = Level::LAKE;

    fn locations(bin: &Bin, offsets: &[(u16, u16)]) -> Vec<GeoPoint2d> {
        offsets
            .iter()
            .map(|&(dx, dy)| bin.frame().location(dx, dy))
            .collect()
    }

    #[test]
    fn all_land_bin_is_prefilled() {
        let bin = bin([LAND; 4], vec![]);
        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].winding, Winding::CounterClockwise);
        assert_eq!(
            polygons[0].points(),
            locations(&bin, &[(0, 0), (65535, 0), (65535, 65535), (0, 65535)])
        );
        assert_relative_eq!(polygons[0].contour.area_signed(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn island_in_lake_bin_is_prefilled() {
        let bin = bin([Level::ISLAND_IN_LAKE; 4], vec![]);
        assert_eq!(bin.assemble_polygons().unwrap().len(), 1);
    }

    #[test]
    fn ocean_and_lake_bins_are_empty() {
        assert!(bin([Level::OCEAN; 4], vec![])
            .assemble_polygons()
            .unwrap()
            .is_empty());
        assert!(bin([LAKE, LAKE, Level::POND_IN_ISLAND, LAKE], vec![])
            .assemble_polygons()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn closed_segments_keep_their_points() {
        let island = [(100, 100), (900, 100), (500, 900)];
        let lake = [(2000, 2000), (2000, 3000), (3000, 2000)];
        let bin = bin(
            [Level::OCEAN; 4],
            vec![closed_segment(LAND, &island), closed_segment(LAKE, &lake)],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].points(), locations(&bin, &island));
        assert_eq!(polygons[0].winding, Winding::CounterClockwise);
        assert_eq!(polygons[1].winding, Winding::Clockwise);
        for polygon in &polygons {
            assert_well_formed(polygon);
        }
    }

    #[test]
    fn closing_point_is_not_repeated() {
        let island = [(100, 100), (900, 100), (500, 900), (100, 100)];
        let bin = bin([Level::OCEAN; 4], vec![closed_segment(LAND, &island)]);
        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons[0].points(), locations(&bin, &island[..3]));
    }

    #[test]
    fn two_segments_meeting_on_the_edge() {
        let a = [(0, 0), (30000, 50), (65535, 100)];
        let b = [(65535, 100), (30000, 20000), (0, 0)];
        let bin = bin(
            [LAND, Level::OCEAN, Level::OCEAN, Level::OCEAN],
            vec![
                open_segment(LAND, Side::South, Side::East, &a),
                open_segment(LAND, Side::East, Side::South, &b),
            ],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(
            polygons[0].points(),
            locations(&bin, &[(0, 0), (30000, 50), (65535, 100), (30000, 20000)])
        );
        assert_eq!(polygons[0].winding, Winding::CounterClockwise);
        assert_well_formed(&polygons[0]);
    }

    #[test]
    fn gaps_are_filled_with_perimeter_points() {
        let a = [(20000, 0), (50000, 10000), (65535, 30000)];
        let b = [(40000, 65535), (20000, 55000), (0, 50000)];
        let bin = bin(
            [LAND, Level::OCEAN, LAND, Level::OCEAN],
            vec![
                open_segment(LAND, Side::South, Side::East, &a),
                open_segment(LAND, Side::North, Side::West, &b),
            ],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 1);

        let mut expected = a.to_vec();
        expected.push((65535, 65535));
        expected.extend_from_slice(&b);
        expected.push((0, 0));
        assert_eq!(polygons[0].points(), locations(&bin, &expected));
        assert_well_formed(&polygons[0]);
    }

    #[test]
    fn ring_shares_edge_points_with_neighbour() {
        let a = [(20000, 0), (50000, 10000), (65535, 30000)];
        let b = [(40000, 65535), (20000, 55000), (0, 50000)];
        let bin = bin(
            [LAND, Level::OCEAN, LAND, Level::OCEAN],
            vec![
                open_segment(LAND, Side::South, Side::East, &a),
                open_segment(LAND, Side::North, Side::West, &b),
            ],
        );
        let polygons = bin.assemble_polygons().unwrap();

        // The east edge of the bin is the west edge of the next one.
        let ne = polygons[0].points()[3];
        assert_eq!(ne.lat(), 10.0);
        assert_eq!(ne.lon(), 11.0);
    }

    #[test]
    fn water_rings_walk_clockwise() {
        let lake = [(0, 10000), (4000, 4000), (10000, 0)];
        let bin = bin(
            [LAKE, LAND, LAND, LAND],
            vec![open_segment(LAKE, Side::West, Side::South, &lake)],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 2);

        // Lowest segment level is water, so land is filled in behind the lake.
        assert_eq!(polygons[0].winding, Winding::CounterClockwise);
        assert_eq!(
            polygons[0].points(),
            locations(
                &bin,
                &[
                    (0, 0),
                    (10000, 0),
                    (65535, 0),
                    (65535, 65535),
                    (0, 65535),
                    (0, 10000)
                ]
            )
        );

        let mut expected = lake.to_vec();
        expected.push((0, 0));
        assert_eq!(polygons[1].points(), locations(&bin, &expected));
        assert_eq!(polygons[1].winding, Winding::Clockwise);
        assert!(polygons[1].contour.area_signed() < 0.0);
        for polygon in &polygons {
            assert_well_formed(polygon);
        }
    }

    #[test]
    fn water_ring_from_two_segments() {
        let l2 = [(0, 20000), (15000, 15000), (30000, 0)];
        let l1 = [(20000, 0), (15000, 5000), (10000, 0)];
        let bin = bin(
            [LAKE, LAND, LAND, LAND],
            vec![
                open_segment(LAKE, Side::West, Side::South, &l2),
                open_segment(LAKE, Side::South, Side::South, &l1),
            ],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].winding, Winding::CounterClockwise);

        // The walk from the exit of l1 passes the south-west corner and wraps onto the west side.
        let mut expected = l2.to_vec();
        expected.extend_from_slice(&l1);
        expected.push((0, 0));
        assert_eq!(polygons[1].points(), locations(&bin, &expected));
        assert_eq!(polygons[1].winding, Winding::Clockwise);
        for polygon in &polygons {
            assert_well_formed(polygon);
        }
    }

    #[test]
    fn lake_inside_land_ring() {
        // Land lies to the left of the coast, so the ring turns north along the east side.
        let coast = [(0, 30000), (30000, 40000), (65535, 30000)];
        let lake = [(40000, 50000), (40000, 55000), (45000, 50000)];
        let bin = bin(
            [Level::OCEAN, Level::OCEAN, LAND, LAND],
            vec![
                open_segment(LAND, Side::West, Side::East, &coast),
                closed_segment(LAKE, &lake),
            ],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 2);

        // Closed segments come before the joined ones.
        assert_eq!(polygons[0].winding, Winding::Clockwise);
        assert_eq!(polygons[0].points(), locations(&bin, &lake));

        let mut expected = coast.to_vec();
        expected.extend_from_slice(&[(65535, 65535), (0, 65535)]);
        assert_eq!(polygons[1].points(), locations(&bin, &expected));
        assert!(polygons[1].contour.area_signed() > 0.0);
        for polygon in &polygons {
            assert_well_formed(polygon);
        }
    }

    #[test]
    fn duplicate_entry_keys_follow_bin_order() {
        let c = [(65535, 500), (30000, 300), (50, 0)];
        let a = [(100, 0), (200, 50), (65535, 100)];
        let b = [(100, 0), (300, 150), (65535, 300)];
        let bin = bin(
            [LAND; 4],
            vec![
                open_segment(LAND, Side::East, Side::South, &c),
                open_segment(LAND, Side::South, Side::East, &a),
                open_segment(LAND, Side::South, Side::East, &b),
            ],
        );

        let polygons = bin.assemble_polygons().unwrap();
        assert_eq!(polygons.len(), 2);
        assert!(polygons[0].points().contains(&bin.frame().location(200, 50)));
        assert!(polygons[1].points().contains(&bin.frame().location(300, 150)));
    }

    #[test]
    fn unknown_sides_are_rejected() {
        let points = [(0, 100), (100, 100), (100, 0)];
        let bin = bin([LAND; 4], vec![record(LAND, 5, 0, &points)]);
        assert_matches!(
            bin.assemble_polygons(),
            Err(ShorelineError::InvalidGeometry {
                segment: 0,
                reason: "unknown entry side",
                ..
            })
        );

        let bin = bin_with_segment(record(LAND, 3, 6, &points));
        assert_matches!(
            bin.assemble_polygons(),
            Err(ShorelineError::InvalidGeometry {
                reason: "unknown exit side",
                ..
            })
        );
    }

    fn bin_with_segment(segment: crate::provider::SegmentRecord) -> Bin {
        bin(
            [LAND; 4],
            vec![closed_segment(LAND, &[(1, 1), (5, 1), (1, 5)]), segment],
        )
    }

    #[test]
    fn closed_segment_must_stay_inside() {
        let points = [(100, 100), (200, 100), (200, 0)];
        let bin = bin_with_segment(record(LAND, CLOSED_SIDE, Side::South.code(), &points));
        assert_matches!(
            bin.assemble_polygons(),
            Err(ShorelineError::InvalidGeometry {
                segment: 1,
                reason: "closed segment leaves the bin",
                ..
            })
        );

        let bin = bin_with_segment(record(LAND, Side::South.code(), CLOSED_SIDE, &points));
        assert_matches!(
            bin.assemble_polygons(),
            Err(ShorelineError::InvalidGeometry {
                segment: 1,
                reason: "open segment does not leave the bin",
                ..
            })
        );
    }

    #[test]
    fn open_segment_without_points() {
        let bin = bin_with_segment(open_segment(LAND, Side::South, Side::East, &[]));
        assert_matches!(
            bin.assemble_polygons(),
            Err(ShorelineError::InvalidGeometry {
                reason: "open segment has no points",
                ..
            })
        );
    }

    #[test]
    fn orientation_lookups_wrap() {
        let set: BTreeSet<PerimeterKey> = [10, 20, 30]
            .map(|v| PerimeterKey::new(Side::South, v))
            .into();
        let key = |v| PerimeterKey::new(Side::South, v);

        assert_eq!(Orientation::Forward.next_key(&set, key(15)), Some(key(20)));
        assert_eq!(Orientation::Forward.next_key(&set, key(20)), Some(key(20)));
        assert_eq!(Orientation::Forward.next_key(&set, key(31)), Some(key(10)));
        assert_eq!(Orientation::Reverse.next_key(&set, key(15)), Some(key(10)));
        assert_eq!(Orientation::Reverse.next_key(&set, key(5)), Some(key(30)));

        let entries: EntrySet = [(key(10), 2), (key(10), 1), (key(30), 0)].into();
        assert_eq!(
            Orientation::Forward.next_entry(&entries, key(5)),
            Some((key(10), 1))
        );
        assert_eq!(
            Orientation::Reverse.next_entry(&entries, key(20)),
            Some((key(10), 1))
        );
        assert_eq!(
            Orientation::Reverse.next_entry(&entries, key(5)),
            Some((key(30), 0))
        );
        assert_eq!(Orientation::Forward.next_entry(&EntrySet::new(), key(5)), None);
    }
}
