use crate::error::Error;
use eyre::Result;
use num_bigint_dig::BigInt;
use num_traits::{Signed, Zero};
use std::{
    fmt,
    ops::{Add, AddAssign, Deref, DerefMut, Mul, SubAssign},
};

/// Plaintext or function vector: an ordered list of arbitrary precision
/// integers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vector(Vec<BigInt>);

impl Vector {
    pub fn new(v: Vec<BigInt>) -> Self {
        Vector(v)
    }

    /// Compute `<self, other>` over the integers.
    pub fn dot(&self, other: &Vector) -> Result<BigInt> {
        if self.len() != other.len() {
            return Err(Error::shape(self.len(), other.len()));
        }
        Ok(self
            .iter()
            .zip(other.iter())
            .fold(BigInt::zero(), |acc, (a, b)| acc + a * b))
    }

    /// Fail with a shape error if the vector length is not `l`.
    pub(crate) fn check_len(&self, l: usize) -> Result<()> {
        if self.len() != l {
            return Err(Error::shape(l, self.len()));
        }
        Ok(())
    }

    /// Fail if some coordinate `v` does not satisfy `|v| < bound`.
    pub(crate) fn check_bound(&self, bound: &BigInt) -> Result<()> {
        match self.iter().position(|v| &v.abs() >= bound) {
            Some(index) => Err(eyre::Report::new(Error::CoordinateOutOfBound {
                index,
                bound: bound.to_string(),
            })),
            None => Ok(()),
        }
    }
}

impl Deref for Vector {
    type Target = [BigInt];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<BigInt>> for Vector {
    fn from(v: Vec<BigInt>) -> Self {
        Vector(v)
    }
}

impl From<Vec<i64>> for Vector {
    fn from(v: Vec<i64>) -> Self {
        v.into_iter().map(BigInt::from).collect()
    }
}

impl From<&[i64]> for Vector {
    fn from(v: &[i64]) -> Self {
        v.iter().map(|&vi| BigInt::from(vi)).collect()
    }
}

impl FromIterator<BigInt> for Vector {
    fn from_iter<I: IntoIterator<Item = BigInt>>(iter: I) -> Self {
        Vector(iter.into_iter().collect())
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// Row-major matrix: one `Vector` per client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Matrix(Vec<Vector>);

impl Matrix {
    pub fn new(rows: Vec<Vector>) -> Self {
        Matrix(rows)
    }

    /// Fail with a shape error unless the matrix has `n` rows of length `l`.
    pub(crate) fn check_shape(&self, n: usize, l: usize) -> Result<()> {
        if self.len() != n || self.iter().any(|row| row.len() != l) {
            return Err(Error::shape(
                format!("{}x{}", n, l),
                format!(
                    "{}x[{}]",
                    self.len(),
                    self.iter()
                        .map(|row| row.len().to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn check_bound(&self, bound: &BigInt) -> Result<()> {
        self.iter().try_for_each(|row| row.check_bound(bound))
    }

    /// Compute `Σᵢ <selfᵢ, otherᵢ>`.
    pub fn dot(&self, other: &Matrix) -> Result<BigInt> {
        if self.len() != other.len() {
            return Err(Error::shape(self.len(), other.len()));
        }
        self.iter()
            .zip(other.iter())
            .try_fold(BigInt::zero(), |acc, (a, b)| Ok(acc + a.dot(b)?))
    }
}

impl Deref for Matrix {
    type Target = [Vector];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Vec<i64>>> for Matrix {
    fn from(m: Vec<Vec<i64>>) -> Self {
        Matrix(m.into_iter().map(Vector::from).collect())
    }
}

impl From<Vec<Vector>> for Matrix {
    fn from(rows: Vec<Vector>) -> Self {
        Matrix(rows)
    }
}

/// DMCFE `T` matrix
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TMat<T>(pub(crate) [[T; 2]; 2]);

impl<T> Deref for TMat<T> {
    type Target = [[T; 2]; 2];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for TMat<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> TMat<T> {
    pub fn new(a: T, b: T, c: T, d: T) -> Self {
        TMat([[a, b], [c, d]])
    }
}

impl<'a, 'b, T, U> Mul<&'b DVec<U>> for &'a TMat<T>
where
    &'a T: Mul<&'b U>,
    <&'a T as Mul<&'b U>>::Output: Add<Output = <&'a T as Mul<&'b U>>::Output>,
{
    type Output = DVec<<&'a T as Mul<&'b U>>::Output>;

    fn mul(self, rhs: &'b DVec<U>) -> Self::Output {
        DVec([
            &self[0][0] * &rhs[0] + &self[0][1] * &rhs[1],
            &self[1][0] * &rhs[0] + &self[1][1] * &rhs[1],
        ])
    }
}

impl<T: AddAssign + Copy> AddAssign<&TMat<T>> for TMat<T> {
    fn add_assign(&mut self, rhs: &TMat<T>) {
        for i in 0..2 {
            for j in 0..2 {
                self[i][j] += rhs[i][j];
            }
        }
    }
}

impl<T: SubAssign + Copy> SubAssign<&TMat<T>> for TMat<T> {
    fn sub_assign(&mut self, rhs: &TMat<T>) {
        for i in 0..2 {
            for j in 0..2 {
                self[i][j] -= rhs[i][j];
            }
        }
    }
}

/// 2 dimensional vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DVec<T>(pub [T; 2]);

impl<T> DVec<T> {
    pub fn new(a: (T, T)) -> Self {
        DVec([a.0, a.1])
    }

    /// Apply `f` to both coordinates.
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> DVec<U> {
        DVec([f(&self[0]), f(&self[1])])
    }
}

impl<T> Deref for DVec<T> {
    type Target = [T; 2];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, 'b, T, U> Mul<&'a U> for &'b DVec<T>
where
    T: 'b,
    &'b T: Mul<&'a U>,
{
    type Output = DVec<<&'b T as Mul<&'a U>>::Output>;

    fn mul(self, rhs: &'a U) -> Self::Output {
        DVec([&self[0] * rhs, &self[1] * rhs])
    }
}

impl<T> Add for DVec<T>
where
    T: Add<Output = T> + Copy,
{
    type Output = DVec<T>;

    fn add(self, rhs: Self) -> Self::Output {
        DVec([self[0] + rhs[0], self[1] + rhs[1]])
    }
}
