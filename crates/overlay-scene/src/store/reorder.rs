use crate::model::OverlayComponent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
	/// One step towards the viewer
	Up,
	/// One step away from the viewer
	Down,
	Top,
	Bottom,
}

impl std::str::FromStr for ReorderDirection {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"up" => Ok(Self::Up),
			"down" => Ok(Self::Down),
			"top" => Ok(Self::Top),
			"bottom" => Ok(Self::Bottom),
			other => Err(format!("unknown reorder direction: {other}")),
		}
	}
}

/// Compute the paint order after moving `id` in `direction`.
///
/// The result is sorted back to front and renumbered `1..=N`. Returns `None`
/// when `id` is not in the collection. Swaps past either boundary leave the
/// order as is.
pub fn reorder(components: &[OverlayComponent], id: &str, direction: ReorderDirection) -> Option<Vec<OverlayComponent>> {
	let mut ordered: Vec<OverlayComponent> = components.to_vec();
	ordered.sort_by_key(OverlayComponent::z_index);

	let index = ordered.iter().position(|c| c.id() == id)?;
	let last = ordered.len() - 1;

	match direction {
		ReorderDirection::Up if index < last => ordered.swap(index, index + 1),
		ReorderDirection::Down if index > 0 => ordered.swap(index, index - 1),
		ReorderDirection::Top => {
			let target = ordered.remove(index);
			ordered.push(target);
		}
		ReorderDirection::Bottom => {
			let target = ordered.remove(index);
			ordered.insert(0, target);
		}
		ReorderDirection::Up | ReorderDirection::Down => {}
	}

	renumber(&mut ordered);
	Some(ordered)
}

fn renumber(components: &mut [OverlayComponent]) {
	for (rank, component) in (1_i64..).zip(components.iter_mut()) {
		component.base_mut().z_index = rank;
	}
}
