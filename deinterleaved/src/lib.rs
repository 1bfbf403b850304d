#![warn(nonstandard_style, rust_2018_idioms, future_incompatible)]
//! De-interleaved audio views.
//!
//! Audio arrives from the host as one slice per channel. These types wrap
//! a slice of channel slices and guarantee every channel has the same length.
//! Sub-ranges are taken into `SmallVec`s sized for eight channels, so slicing
//! does not touch the heap for any layout this project supports.
use std::ops::Index;
use std::ops::IndexMut;
use std::ops::Range;

use smallvec::SmallVec;

fn same_lengths<T: AsRef<[f32]>>(channels: &[T]) -> bool {
    channels
        .windows(2)
        .all(|pair| pair[0].as_ref().len() == pair[1].as_ref().len())
}

pub type SubBufferMut<'a> = SmallVec<[&'a mut [f32]; 8]>;
pub type SubBuffer<'a> = SmallVec<[&'a [f32]; 8]>;

pub struct AudioBufferMut<'c, 'a: 'c> {
    buf: &'c mut [&'a mut [f32]],
}

impl<'c, 'a: 'c> AudioBufferMut<'c, 'a> {
    pub fn new(buf: &'c mut [&'a mut [f32]]) -> AudioBufferMut<'c, 'a> {
        assert!(same_lengths(buf));
        AudioBufferMut { buf }
    }

    pub fn slice<'d>(&'d mut self, range: Range<usize>) -> SubBufferMut<'d> {
        self.buf
            .iter_mut()
            .map(|chan| (*chan).index_mut(range.clone()))
            .collect()
    }

    /// Frames per channel. A buffer without channels has no frames.
    pub fn len(&self) -> usize {
        self.buf.first().map_or(0, |chan| chan.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_channels(&self) -> usize {
        self.buf.len()
    }

    pub fn fill(&mut self, value: f32) {
        for chan in self.buf.iter_mut() {
            chan.fill(value);
        }
    }

    /// Copies `source` channel by channel. Both buffers must have the same
    /// shape.
    pub fn copy_from(&mut self, source: &AudioBuffer<'_, '_>) {
        assert_eq!(self.num_channels(), source.num_channels());
        for (dst, src) in self.buf.iter_mut().zip(source) {
            dst.copy_from_slice(src);
        }
    }
}

impl<'c, 'a: 'c> From<&'c mut [&'a mut [f32]]> for AudioBufferMut<'c, 'a> {
    fn from(buf: &'c mut [&'a mut [f32]]) -> AudioBufferMut<'c, 'a> {
        AudioBufferMut::new(buf)
    }
}

impl<'c, 'a: 'c> From<&'c mut SubBufferMut<'a>> for AudioBufferMut<'c, 'a> {
    fn from(buf: &'c mut SubBufferMut<'a>) -> AudioBufferMut<'c, 'a> {
        AudioBufferMut::new(buf)
    }
}

impl<'d, 'c: 'd, 'a: 'c> From<&'d mut AudioBufferMut<'c, 'a>> for AudioBufferMut<'d, 'a> {
    fn from(buf: &'d mut AudioBufferMut<'c, 'a>) -> AudioBufferMut<'d, 'a> {
        AudioBufferMut { buf: &mut *buf.buf }
    }
}

pub struct IterMut<'c, 'a: 'c> {
    iter: std::slice::IterMut<'c, &'a mut [f32]>,
}

impl<'c, 'a> Iterator for IterMut<'c, 'a> {
    type Item = &'c mut [f32];

    fn next(&mut self) -> Option<&'c mut [f32]> {
        self.iter.next().map(|r: &'c mut &'a mut [f32]| {
            let ret: &'c mut [f32] = *r;
            ret
        })
    }
}

impl<'d, 'c: 'd, 'a: 'c> IntoIterator for &'d mut AudioBufferMut<'c, 'a> {
    type Item = &'d mut [f32];
    type IntoIter = IterMut<'d, 'a>;
    fn into_iter(self) -> IterMut<'d, 'a> {
        IterMut {
            iter: self.buf.iter_mut(),
        }
    }
}

impl<'c, 'a: 'c> Index<usize> for AudioBufferMut<'c, 'a> {
    type Output = [f32];

    fn index(&self, index: usize) -> &[f32] {
        self.buf[index]
    }
}

impl<'c, 'a: 'c> IndexMut<usize> for AudioBufferMut<'c, 'a> {
    fn index_mut(&mut self, index: usize) -> &mut [f32] {
        self.buf[index]
    }
}

pub struct AudioBuffer<'c, 'a: 'c> {
    buf: &'c [&'a [f32]],
}

impl<'c, 'a: 'c> AudioBuffer<'c, 'a> {
    pub fn new(buf: &'c [&'a [f32]]) -> AudioBuffer<'c, 'a> {
        assert!(same_lengths(buf));
        AudioBuffer { buf }
    }

    pub fn slice(&self, range: Range<usize>) -> SubBuffer<'a> {
        self.buf
            .iter()
            .map(|chan| {
                let chan: &'a [f32] = *chan;
                &chan[range.clone()]
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buf.first().map_or(0, |chan| chan.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_channels(&self) -> usize {
        self.buf.len()
    }
}

impl<'c, 'a: 'c> From<&'c [&'a [f32]]> for AudioBuffer<'c, 'a> {
    fn from(buf: &'c [&'a [f32]]) -> AudioBuffer<'c, 'a> {
        AudioBuffer::new(buf)
    }
}

impl<'c, 'a: 'c> From<&'c SubBuffer<'a>> for AudioBuffer<'c, 'a> {
    fn from(buf: &'c SubBuffer<'a>) -> AudioBuffer<'c, 'a> {
        AudioBuffer::new(buf)
    }
}

impl<'d, 'c: 'd, 'a: 'c> From<&'d AudioBuffer<'c, 'a>> for AudioBuffer<'d, 'a> {
    fn from(buf: &'d AudioBuffer<'c, 'a>) -> AudioBuffer<'d, 'a> {
        AudioBuffer { buf: buf.buf }
    }
}

pub struct Iter<'c, 'a: 'c> {
    iter: std::slice::Iter<'c, &'a [f32]>,
}

impl<'c, 'a> Iterator for Iter<'c, 'a> {
    type Item = &'a [f32];

    fn next(&mut self) -> Option<&'a [f32]> {
        self.iter.next().copied()
    }
}

impl<'d, 'c: 'd, 'a: 'c> IntoIterator for &'d AudioBuffer<'c, 'a> {
    type Item = &'a [f32];
    type IntoIter = Iter<'d, 'a>;
    fn into_iter(self) -> Iter<'d, 'a> {
        Iter {
            iter: self.buf.iter(),
        }
    }
}

impl<'c, 'a: 'c> Index<usize> for AudioBuffer<'c, 'a> {
    type Output = [f32];

    fn index(&self, index: usize) -> &[f32] {
        self.buf[index]
    }
}
