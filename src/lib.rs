// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Converts MIDI performances into the four compact strings a voxel game's
//! scripting engine plays back, with reports and an optional audio preview.

pub mod alphabet;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod encoder;
pub mod mapper;
pub mod midi;
pub mod output;
pub mod render;
pub mod report;

#[cfg(test)]
mod test;
#[cfg(test)]
mod testutil;
