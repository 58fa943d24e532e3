use crate::{Particle, ParticleCellAccess};

use core::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One value per particle, stored in linear iteration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ParticleData<T> {
    values: Vec<T>,
}

impl<T> ParticleData<T> {
    /// Takes ownership of `values`, which must hold exactly one value per particle of `access`.
    pub fn new(access: &ParticleCellAccess, values: Vec<T>) -> Self {
        assert_eq!(values.len() as u64, access.total_particles());

        Self { values }
    }

    /// Calls `filler` on each particle, in order.
    pub fn from_fn(access: &ParticleCellAccess, mut filler: impl FnMut(&Particle) -> T) -> Self {
        Self {
            values: access.iter().map(|p| filler(&p)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, global_index: usize) -> Option<&T> {
        self.values.get(global_index)
    }

    #[inline]
    pub fn get_mut(&mut self, global_index: usize) -> Option<&mut T> {
        self.values.get_mut(global_index)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> ParticleData<U> {
        ParticleData {
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> ParticleData<T> {
    pub fn filled(access: &ParticleCellAccess, value: T) -> Self {
        Self {
            values: vec![value; access.total_particles() as usize],
        }
    }
}

impl<T> Index<usize> for ParticleData<T> {
    type Output = T;

    #[inline]
    fn index(&self, global_index: usize) -> &T {
        &self.values[global_index]
    }
}

impl<T> IndexMut<usize> for ParticleData<T> {
    #[inline]
    fn index_mut(&mut self, global_index: usize) -> &mut T {
        &mut self.values[global_index]
    }
}

impl<T> Index<&Particle> for ParticleData<T> {
    type Output = T;

    #[inline]
    fn index(&self, particle: &Particle) -> &T {
        &self.values[particle.global_index as usize]
    }
}

impl<T> IndexMut<&Particle> for ParticleData<T> {
    #[inline]
    fn index_mut(&mut self, particle: &Particle) -> &mut T {
        &mut self.values[particle.global_index as usize]
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
