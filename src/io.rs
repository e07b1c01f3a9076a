//! Binary (de)serialization matching the documented wire format: native
//! byte order and width for every multi-byte value, fields conditionally
//! present when a booster's `using_fold` flag says its alpha coefficients
//! aren't stored, and "linked lists" written as a `u32` count followed by
//! that many element records in order.
//!
//! This is a from-scratch reader/writer pair rather than a derived `serde`
//! impl, because the wire format's conditional alpha array can't be
//! expressed as a straight field-by-field encoding of the in-memory
//! structs.
use std::io::{Cursor, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::booster::{HaarBooster, Round, VectorBinaryBooster, VectorMulticlassBooster};
use crate::cascade::Cascade;
use crate::error::{Error, Result};
use crate::numeric::haar::{HaarFeature, HaarKind};
use crate::weak_learner::stump::{Confidence, ContinuousStump, DiscreteStump, Plain, Stump};
use crate::weak_learner::{HaarStump, VectorStump};

/// Derive-based `bincode` (de)serialization of a whole [`Cascade`], for
/// callers that just want a convenient native-Rust snapshot rather than
/// spec.md §6.1's exact wire layout. `mtn-viola-jones` keeps the same kind
/// of split: a hand-written exact format for interop, and a `serde`-driven
/// path (there, `bincode`/`serde_json`) for round-tripping within Rust.
/// `bincode`'s `Option<T>` encoding (a presence byte then the value) is not
/// the same byte layout as the hand-rolled [`write_cascade`] below, so the
/// two paths are not wire-compatible with each other.
pub fn cascade_to_bincode<O: Serialize>(c: &Cascade<O>) -> Result<Vec<u8>> {
    bincode::serialize(c).map_err(Error::Bincode)
}

/// Deserialize a cascade previously written by [`cascade_to_bincode`].
pub fn cascade_from_bincode<O: DeserializeOwned>(bytes: &[u8]) -> Result<Cascade<O>> {
    bincode::deserialize(bytes).map_err(Error::Bincode)
}

fn write_bool<W: Write>(w: &mut W, v: bool) -> Result<()> {
    w.write_all(&[v as u8]).map_err(Error::Io)
}
fn read_bool<R: Read>(r: &mut R) -> Result<bool> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b).map_err(Error::Io)?;
    Ok(b[0] != 0)
}
fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&v.to_ne_bytes()).map_err(Error::Io)
}
fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b).map_err(Error::Io)?;
    Ok(u32::from_ne_bytes(b))
}
fn write_i32<W: Write>(w: &mut W, v: i32) -> Result<()> {
    w.write_all(&v.to_ne_bytes()).map_err(Error::Io)
}
fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b).map_err(Error::Io)?;
    Ok(i32::from_ne_bytes(b))
}
fn write_f64<W: Write>(w: &mut W, v: f64) -> Result<()> {
    w.write_all(&v.to_ne_bytes()).map_err(Error::Io)
}
fn read_f64<R: Read>(r: &mut R) -> Result<f64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b).map_err(Error::Io)?;
    Ok(f64::from_ne_bytes(b))
}

/// A stump output kind that additionally knows how to read/write its own
/// wire encoding (`int[2]`/`int[count]` for [`Plain`], `float[2]`/
/// `float[count]` for [`Confidence`]).
pub trait WireOutput: Sized {
    fn write_output<W: Write>(&self, w: &mut W) -> Result<()>;
    fn read_output<R: Read>(r: &mut R) -> Result<Self>;
}

impl WireOutput for Plain {
    fn write_output<W: Write>(&self, w: &mut W) -> Result<()> {
        write_i32(w, self.0 as i32)
    }
    fn read_output<R: Read>(r: &mut R) -> Result<Self> {
        Ok(Plain(read_i32(r)? as i8))
    }
}

impl WireOutput for Confidence {
    fn write_output<W: Write>(&self, w: &mut W) -> Result<()> {
        write_f64(w, self.0)
    }
    fn read_output<R: Read>(r: &mut R) -> Result<Self> {
        Ok(Confidence(read_f64(r)?))
    }
}

fn write_haar_feature<W: Write>(w: &mut W, f: &HaarFeature) -> Result<()> {
    let tag = match f.kind {
        HaarKind::TwoHorizontal => 0u8,
        HaarKind::TwoVertical => 1,
        HaarKind::ThreeHorizontal => 2,
        HaarKind::FourQuad => 3,
    };
    w.write_all(&[tag]).map_err(Error::Io)?;
    write_u32(w, f.start_x as u32)?;
    write_u32(w, f.start_y as u32)?;
    write_u32(w, f.width as u32)?;
    write_u32(w, f.height as u32)
}

fn read_haar_feature<R: Read>(r: &mut R) -> Result<HaarFeature> {
    let mut tag = [0u8; 1];
    r.read_exact(&mut tag).map_err(Error::Io)?;
    let kind = match tag[0] {
        0 => HaarKind::TwoHorizontal,
        1 => HaarKind::TwoVertical,
        2 => HaarKind::ThreeHorizontal,
        _ => HaarKind::FourQuad,
    };
    let start_x = read_u32(r)? as usize;
    let start_y = read_u32(r)? as usize;
    let width = read_u32(r)? as usize;
    let height = read_u32(r)? as usize;
    Ok(HaarFeature::new(kind, start_x, start_y, width, height))
}

fn write_continuous<O: WireOutput, W: Write>(w: &mut W, s: &ContinuousStump<O>) -> Result<()> {
    write_f64(w, s.threshold)?;
    s.below.write_output(w)?;
    s.above.write_output(w)
}
fn read_continuous<O: WireOutput, R: Read>(r: &mut R) -> Result<ContinuousStump<O>> {
    let threshold = read_f64(r)?;
    let below = O::read_output(r)?;
    let above = O::read_output(r)?;
    Ok(ContinuousStump { threshold, below, above })
}

fn write_discrete<O: WireOutput, W: Write>(w: &mut W, s: &DiscreteStump<O>) -> Result<()> {
    write_u32(w, s.values.len() as u32)?;
    s.default.write_output(w)?;
    for v in &s.values {
        write_f64(w, *v)?;
    }
    for o in &s.outputs {
        o.write_output(w)?;
    }
    Ok(())
}
fn read_discrete<O: WireOutput, R: Read>(r: &mut R) -> Result<DiscreteStump<O>> {
    let count = read_u32(r)? as usize;
    let default = O::read_output(r)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_f64(r)?);
    }
    let mut outputs = Vec::with_capacity(count);
    for _ in 0..count {
        outputs.push(O::read_output(r)?);
    }
    Ok(DiscreteStump { values, outputs, default })
}

fn write_stump<O: WireOutput, W: Write>(w: &mut W, s: &Stump<O>) -> Result<()> {
    match s {
        Stump::Continuous(c) => {
            w.write_all(&[0u8]).map_err(Error::Io)?;
            write_continuous(w, c)
        }
        Stump::Discrete(d) => {
            w.write_all(&[1u8]).map_err(Error::Io)?;
            write_discrete(w, d)
        }
    }
}
fn read_stump<O: WireOutput, R: Read>(r: &mut R) -> Result<Stump<O>> {
    let mut tag = [0u8; 1];
    r.read_exact(&mut tag).map_err(Error::Io)?;
    match tag[0] {
        0 => Ok(Stump::Continuous(read_continuous(r)?)),
        _ => Ok(Stump::Discrete(read_discrete(r)?)),
    }
}

fn write_vector_stump<O: WireOutput, W: Write>(w: &mut W, s: &VectorStump<O>) -> Result<()> {
    write_u32(w, s.feature_index as u32)?;
    write_stump(w, &s.stump)
}
fn read_vector_stump<O: WireOutput, R: Read>(r: &mut R) -> Result<VectorStump<O>> {
    let feature_index = read_u32(r)? as usize;
    let stump = read_stump(r)?;
    Ok(VectorStump { feature_index, stump })
}

fn write_haar_stump<O: WireOutput, W: Write>(w: &mut W, s: &HaarStump<O>) -> Result<()> {
    write_haar_feature(w, &s.haar)?;
    write_continuous(w, &s.stump)
}
fn read_haar_stump<O: WireOutput, R: Read>(r: &mut R) -> Result<HaarStump<O>> {
    let haar = read_haar_feature(r)?;
    let stump = read_continuous(r)?;
    Ok(HaarStump { haar, stump })
}

/// Write a [`VectorBinaryBooster`]: `using_fold`, round count `T`, then
/// (only if not folded) `alpha[T]`, then `T` vector-stump records.
pub fn write_vector_binary<O: WireOutput, W: Write>(w: &mut W, b: &VectorBinaryBooster<O>) -> Result<()> {
    write_bool(w, b.using_fold)?;
    write_u32(w, b.rounds.len() as u32)?;
    if !b.using_fold {
        for round in &b.rounds {
            write_f64(w, round.alpha)?;
        }
    }
    for round in &b.rounds {
        write_vector_stump(w, &round.hypothesis)?;
    }
    Ok(())
}

pub fn read_vector_binary<O: WireOutput, R: Read>(r: &mut R) -> Result<VectorBinaryBooster<O>> {
    let using_fold = read_bool(r)?;
    let count = read_u32(r)? as usize;
    let alphas = if using_fold { vec![1.0; count] } else { (0..count).map(|_| read_f64(r)).collect::<Result<Vec<_>>>()? };
    let mut rounds = Vec::with_capacity(count);
    for alpha in alphas {
        rounds.push(Round { alpha, hypothesis: read_vector_stump(r)? });
    }
    Ok(VectorBinaryBooster { using_fold, rounds })
}

/// Write a [`VectorMulticlassBooster`]: `using_fold`, `group_count`, `K`,
/// then (if not folded) `alpha[group_count]`, then `group_count*K`
/// vector-stump records in row-major `(group, class)` order.
pub fn write_vector_multiclass<O: WireOutput, W: Write>(w: &mut W, b: &VectorMulticlassBooster<O>) -> Result<()> {
    write_bool(w, b.using_fold)?;
    write_u32(w, b.rounds.len() as u32)?;
    write_u32(w, b.n_classes as u32)?;
    if !b.using_fold {
        for round in &b.rounds {
            write_f64(w, round.alpha)?;
        }
    }
    for round in &b.rounds {
        for stump in &round.hypothesis {
            write_vector_stump(w, stump)?;
        }
    }
    Ok(())
}

pub fn read_vector_multiclass<O: WireOutput, R: Read>(r: &mut R) -> Result<VectorMulticlassBooster<O>> {
    let using_fold = read_bool(r)?;
    let group_count = read_u32(r)? as usize;
    let n_classes = read_u32(r)? as usize;
    let alphas = if using_fold {
        vec![1.0; group_count]
    } else {
        (0..group_count).map(|_| read_f64(r)).collect::<Result<Vec<_>>>()?
    };
    let mut rounds = Vec::with_capacity(group_count);
    for alpha in alphas {
        let mut group = Vec::with_capacity(n_classes);
        for _ in 0..n_classes {
            group.push(read_vector_stump(r)?);
        }
        rounds.push(Round { alpha, hypothesis: group });
    }
    Ok(VectorMulticlassBooster { using_fold, n_classes, rounds })
}

/// Write a [`HaarBooster`]: `using_fold`, `threshold`, then a linked list
/// of learner records, each an optional `alpha` (present iff not folded)
/// followed by the learner body.
pub fn write_haar_booster<O: WireOutput, W: Write>(w: &mut W, b: &HaarBooster<O>) -> Result<()> {
    write_bool(w, b.using_fold)?;
    write_f64(w, b.threshold)?;
    write_u32(w, b.rounds.len() as u32)?;
    for round in &b.rounds {
        if !b.using_fold {
            write_f64(w, round.alpha)?;
        }
        write_haar_stump(w, &round.hypothesis)?;
    }
    Ok(())
}

pub fn read_haar_booster<O: WireOutput, R: Read>(r: &mut R) -> Result<HaarBooster<O>> {
    let using_fold = read_bool(r)?;
    let threshold = read_f64(r)?;
    let count = read_u32(r)? as usize;
    let mut rounds = Vec::with_capacity(count);
    for _ in 0..count {
        let alpha = if using_fold { 1.0 } else { read_f64(r)? };
        rounds.push(Round { alpha, hypothesis: read_haar_stump(r)? });
    }
    Ok(HaarBooster { using_fold, threshold, rounds })
}

/// Write a [`Cascade`]: `image_size`, cumulative `fp_rate`, cumulative
/// `det_rate`, then a linked list of Haar-booster records.
pub fn write_cascade<O: WireOutput, W: Write>(w: &mut W, c: &Cascade<O>) -> Result<()> {
    write_u32(w, c.window as u32)?;
    write_f64(w, c.false_positive_rate)?;
    write_f64(w, c.detection_rate)?;
    write_u32(w, c.stages.len() as u32)?;
    for stage in &c.stages {
        write_haar_booster(w, stage)?;
    }
    Ok(())
}

pub fn read_cascade<O: WireOutput, R: Read>(r: &mut R) -> Result<Cascade<O>> {
    let window = read_u32(r)? as usize;
    let false_positive_rate = read_f64(r)?;
    let detection_rate = read_f64(r)?;
    let count = read_u32(r)? as usize;
    let mut stages = Vec::with_capacity(count);
    for _ in 0..count {
        stages.push(read_haar_booster(r)?);
    }
    Ok(Cascade { window, false_positive_rate, detection_rate, stages })
}

/// Serialize a cascade to an in-memory byte buffer.
pub fn cascade_to_bytes<O: WireOutput>(c: &Cascade<O>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_cascade(&mut buf, c)?;
    Ok(buf)
}

/// Deserialize a cascade previously written by [`cascade_to_bytes`].
pub fn cascade_from_bytes<O: WireOutput>(bytes: &[u8]) -> Result<Cascade<O>> {
    let mut cursor = Cursor::new(bytes);
    read_cascade(&mut cursor)
}
