// crates/mh_mesh/src/mesh.rs

//! 只读三角网格
//!
//! 几何与连接表在构造后不再改变；空间索引在构造时建立一次，
//! 随网格一起释放。

use crate::error::{MeshError, MeshResult};
use crate::spatial_index::{MeshSpatialIndex, SpatialBounds};
use mh_foundation::GeomTolerance;
use mh_geo::Point2D;
use mh_io::SerafinHeader;
use tracing::debug;

/// 二维三角网格
pub struct TriMesh {
    points: Vec<Point2D>,
    triangles: Vec<[usize; 3]>,
    index: MeshSpatialIndex,
    tolerance: GeomTolerance,
}

impl std::fmt::Debug for TriMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriMesh")
            .field("n_nodes", &self.points.len())
            .field("n_triangles", &self.triangles.len())
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl TriMesh {
    /// 由节点和三角形构造（默认容差）
    pub fn new(points: Vec<Point2D>, triangles: Vec<[usize; 3]>) -> MeshResult<Self> {
        Self::with_tolerance(points, triangles, GeomTolerance::default())
    }

    /// 由节点和三角形构造（指定容差）
    pub fn with_tolerance(
        points: Vec<Point2D>,
        triangles: Vec<[usize; 3]>,
        tolerance: GeomTolerance,
    ) -> MeshResult<Self> {
        let n_nodes = points.len();
        if let Some((t, tri)) = triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&n| n >= n_nodes))
        {
            return Err(MeshError::invalid_topology(
                "build_mesh",
                format!("三角形 {t} 引用了不存在的节点 {tri:?}（节点数 {n_nodes}）"),
            ));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::invalid_topology(
                "build_mesh",
                format!("节点 {i} 坐标无效"),
            ));
        }

        let index = MeshSpatialIndex::build(
            triangles.len(),
            |i| triangles[i].map(|n| points[n]),
            tolerance.eps,
        );
        debug!(
            "三角网格: {} 节点, {} 三角形, R-Tree 已建立",
            n_nodes,
            triangles.len()
        );

        Ok(Self {
            points,
            triangles,
            index,
            tolerance,
        })
    }

    /// 由 Serafin 文件头构造
    ///
    /// 三维文件头或非三角形单元会被拒绝。
    pub fn from_header(header: &SerafinHeader) -> MeshResult<Self> {
        if !header.is_2d() {
            return Err(MeshError::Unsupported3D {
                planes: header.nb_planes(),
            });
        }
        if header.nb_nodes_per_element != 3 {
            return Err(MeshError::invalid_topology(
                "from_header",
                format!("每单元节点数为 {}，只支持三角形", header.nb_nodes_per_element),
            ));
        }
        header.validate()?;

        let points = header
            .x
            .iter()
            .zip(&header.y)
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        Self::new(points, header.triangles().collect())
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.points.len()
    }

    /// 三角形数
    #[inline]
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// 节点坐标
    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// 连接表
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// 三角形的节点编号
    #[inline]
    pub fn triangle(&self, id: usize) -> [usize; 3] {
        self.triangles[id]
    }

    /// 三角形的顶点坐标
    #[inline]
    pub fn triangle_points(&self, id: usize) -> [Point2D; 3] {
        self.triangles[id].map(|n| self.points[n])
    }

    /// 几何容差
    #[inline]
    pub fn tolerance(&self) -> &GeomTolerance {
        &self.tolerance
    }

    /// 空间索引
    #[inline]
    pub fn spatial_index(&self) -> &MeshSpatialIndex {
        &self.index
    }

    /// 网格包围盒
    pub fn bounds(&self) -> Option<SpatialBounds> {
        self.index.bounds()
    }
}
